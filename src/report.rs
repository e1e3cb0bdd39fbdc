//! Text and JSON rendering of filters for the command line.

use crate::filter::{Filter, SortState, Term};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

/// One row per term, in canonical order.
pub fn terms_table(filter: &Filter) -> Table {
    let mut table = create_styled_table(&["#", "Keyword", "Relation", "Value", "Kind"]);
    let rows = filter
        .meta_terms()
        .map(|term| (term, "meta"))
        .chain(filter.criteria().iter().map(|term| (term, "criterion")));
    for (i, (term, kind)) in rows.enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(term.keyword()),
            Cell::new(term.relation()),
            Cell::new(term.value()),
            Cell::new(kind),
        ]);
    }
    table
}

/// Machine-readable view of a filter.
#[derive(Debug, Serialize)]
pub struct FilterReport<'a> {
    pub filter: String,
    pub criteria: String,
    pub terms: Vec<&'a Term>,
    pub sort: SortState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_qod: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_overrides: Option<bool>,
}

impl<'a> FilterReport<'a> {
    pub fn new(filter: &'a Filter) -> Self {
        Self {
            filter: filter.to_filter_string(),
            criteria: filter.criteria_string(),
            terms: filter.terms().collect(),
            sort: filter.sort_state(),
            first: filter.first(),
            rows: filter.rows(),
            levels: filter.levels().map(|levels| levels.to_string()),
            min_qod: filter.min_qod(),
            apply_overrides: filter.apply_overrides(),
        }
    }
}

/// Term-level difference between two filters, compared in canonical form.
#[derive(Debug, Default, Serialize)]
pub struct FilterDiff {
    pub equivalent: bool,
    pub removed: Vec<String>,
    pub added: Vec<String>,
    pub unchanged: Vec<String>,
    #[serde(skip)]
    changes: Vec<(ChangeTag, String)>,
}

impl FilterDiff {
    pub fn between(old: &Filter, new: &Filter) -> Self {
        let old_terms = term_strings(old);
        let new_terms = term_strings(new);
        let old_refs: Vec<&str> = old_terms.iter().map(String::as_str).collect();
        let new_refs: Vec<&str> = new_terms.iter().map(String::as_str).collect();
        let diff = TextDiff::from_slices(&old_refs, &new_refs);

        let mut result = FilterDiff {
            equivalent: old.is_equivalent(new),
            ..FilterDiff::default()
        };
        for change in diff.iter_all_changes() {
            let term = change.value().to_string();
            match change.tag() {
                ChangeTag::Delete => result.removed.push(term.clone()),
                ChangeTag::Insert => result.added.push(term.clone()),
                ChangeTag::Equal => result.unchanged.push(term.clone()),
            }
            result.changes.push((change.tag(), term));
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Unified-style listing, one term per line.
    pub fn to_colored_text(&self) -> String {
        let mut out = String::new();
        for (tag, term) in &self.changes {
            let line = match tag {
                ChangeTag::Delete => format!("- {term}").red().to_string(),
                ChangeTag::Insert => format!("+ {term}").green().to_string(),
                ChangeTag::Equal => format!("  {term}"),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn term_strings(filter: &Filter) -> Vec<String> {
    filter.terms().map(Term::to_term_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Relation;

    #[test]
    fn test_terms_table_lists_every_term() {
        let filter = Filter::from_string("rows=10 text~\"hello world\"");
        let rendered = terms_table(&filter).to_string();
        assert!(rendered.contains("rows"));
        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("criterion"));
        assert!(rendered.contains("meta"));
    }

    #[test]
    fn test_report_skips_absent_meta() {
        let filter = Filter::from_string("name~scan sort-reverse=severity");
        let json = serde_json::to_value(FilterReport::new(&filter)).unwrap();
        assert_eq!(json["filter"], "sort-reverse=severity name~scan");
        assert_eq!(json["criteria"], "name~scan");
        assert_eq!(json["sort"]["order"], "descending");
        assert_eq!(json["sort"]["field"], "severity");
        assert!(json.get("rows").is_none());
        assert_eq!(json["terms"][1]["relation"], "~");
    }

    #[test]
    fn test_diff_between_filters() {
        let old = Filter::from_string("rows=10 first=1 tag=a");
        let new = Filter::from_string("rows=10 first=11 tag=a tag=b");
        let diff = FilterDiff::between(&old, &new);
        assert_eq!(diff.removed, vec!["first=1"]);
        assert_eq!(diff.added, vec!["first=11", "tag=b"]);
        assert_eq!(diff.unchanged, vec!["rows=10", "tag=a"]);
        assert!(!diff.equivalent);
    }

    #[test]
    fn test_diff_of_reordered_criteria_is_equivalent() {
        let old = Filter::from_string("tag=a name=x");
        let new = Filter::from_string("name=x tag=a");
        let diff = FilterDiff::between(&old, &new);
        assert!(diff.equivalent);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_diff_keeps_multiline_value_in_one_term() {
        let old = Filter::new().set("comment", "a\nb", Relation::Equal);
        let diff = FilterDiff::between(&old, &Filter::new());
        assert_eq!(diff.removed, vec!["comment=\"a\nb\""]);
        assert!(diff.added.is_empty());
        assert!(diff.unchanged.is_empty());
    }

    #[test]
    fn test_colored_text_marks_changes() {
        colored::control::set_override(false);
        let diff = FilterDiff::between(
            &Filter::from_string("rows=10"),
            &Filter::from_string("rows=20"),
        );
        assert_eq!(diff.to_colored_text(), "- rows=10\n+ rows=20\n");
    }
}
