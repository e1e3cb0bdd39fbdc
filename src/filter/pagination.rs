//! Typed access to the meta keywords, including the sort state machine and
//! page navigation.

use super::expression::Filter;
use super::keywords::{MetaKeyword, SeverityLevels};
use super::term::Term;
use serde::Serialize;

/// Result ordering requested by a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "order", content = "field", rename_all = "lowercase")]
pub enum SortState {
    Unsorted,
    Ascending(String),
    Descending(String),
}

impl SortState {
    pub fn field(&self) -> Option<&str> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(field) | SortState::Descending(field) => Some(field),
        }
    }
}

impl Filter {
    /// Value of a meta keyword if it is well-formed for that keyword.
    pub(super) fn typed_value(&self, keyword: MetaKeyword) -> Option<&str> {
        let value = self.meta_term(keyword)?.value();
        if keyword.accepts(value) {
            Some(value)
        } else {
            tracing::trace!(%keyword, value, "ignoring ill-formed meta value");
            None
        }
    }

    fn with_meta(mut self, keyword: MetaKeyword, value: impl Into<String>) -> Self {
        self.insert_meta(keyword, Term::meta(keyword, value));
        self
    }

    /// 1-based index of the first row on the page.
    pub fn first(&self) -> Option<u32> {
        self.typed_value(MetaKeyword::First)?.parse().ok()
    }

    /// Sets `first`; values below 1 become 1.
    pub fn set_first(self, first: u32) -> Self {
        self.with_meta(MetaKeyword::First, first.max(1).to_string())
    }

    /// Page size, where `0` means all rows.
    pub fn rows(&self) -> Option<u32> {
        self.typed_value(MetaKeyword::Rows)?.parse().ok()
    }

    pub fn set_rows(self, rows: u32) -> Self {
        self.with_meta(MetaKeyword::Rows, rows.to_string())
    }

    pub fn levels(&self) -> Option<SeverityLevels> {
        self.typed_value(MetaKeyword::Levels)?.parse().ok()
    }

    pub fn set_levels(self, levels: &SeverityLevels) -> Self {
        self.with_meta(MetaKeyword::Levels, levels.to_string())
    }

    /// Quality-of-detection floor, 0 to 100.
    pub fn min_qod(&self) -> Option<u8> {
        self.typed_value(MetaKeyword::MinQod)?.parse().ok()
    }

    /// Sets `min_qod`, clamped to 100.
    pub fn set_min_qod(self, min_qod: u8) -> Self {
        self.with_meta(MetaKeyword::MinQod, min_qod.min(100).to_string())
    }

    pub fn apply_overrides(&self) -> Option<bool> {
        self.typed_value(MetaKeyword::ApplyOverrides)
            .map(|value| value == "1")
    }

    pub fn set_apply_overrides(self, apply: bool) -> Self {
        self.with_meta(MetaKeyword::ApplyOverrides, if apply { "1" } else { "0" })
    }

    pub fn sort_state(&self) -> SortState {
        if let Some(field) = self.typed_value(MetaKeyword::SortReverse) {
            SortState::Descending(field.to_string())
        } else if let Some(field) = self.typed_value(MetaKeyword::Sort) {
            SortState::Ascending(field.to_string())
        } else {
            SortState::Unsorted
        }
    }

    pub fn sort_field(&self) -> Option<String> {
        self.sort_state().field().map(str::to_string)
    }

    /// Sort ascending by `field`, dropping any `sort-reverse`.
    pub fn set_sort(self, field: &str) -> Self {
        self.with_meta(MetaKeyword::Sort, field)
    }

    /// Sort descending by `field`, dropping any `sort`.
    pub fn set_sort_reverse(self, field: &str) -> Self {
        self.with_meta(MetaKeyword::SortReverse, field)
    }

    pub fn clear_sort(mut self) -> Self {
        self.remove_meta(MetaKeyword::Sort);
        self.remove_meta(MetaKeyword::SortReverse);
        self
    }

    /// Move to `state`.
    pub fn with_sort_state(self, state: &SortState) -> Self {
        match state {
            SortState::Unsorted => self.clear_sort(),
            SortState::Ascending(field) => self.set_sort(field),
            SortState::Descending(field) => self.set_sort_reverse(field),
        }
    }

    pub fn first_page(self) -> Self {
        self.set_first(1)
    }

    /// Advance `first` by one page. Unchanged when the page size is unknown
    /// or `0` (all rows).
    pub fn next_page(self) -> Self {
        match self.rows() {
            Some(rows) if rows > 0 => {
                let first = self.first().unwrap_or(1);
                self.set_first(first.saturating_add(rows))
            }
            _ => self,
        }
    }

    /// Step `first` back by one page, never below 1.
    pub fn previous_page(self) -> Self {
        match self.rows() {
            Some(rows) if rows > 0 => {
                let first = self.first().unwrap_or(1);
                self.set_first(first.saturating_sub(rows))
            }
            _ => self,
        }
    }

    /// Everything on one page: `first=1 rows=0`.
    pub fn all_rows(self) -> Self {
        self.set_first(1).set_rows(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::keywords::SeverityClass;

    #[test]
    fn test_sort_transitions() {
        let filter = Filter::new();
        assert_eq!(filter.sort_state(), SortState::Unsorted);

        let filter = filter.set_sort("name");
        assert_eq!(filter.sort_state(), SortState::Ascending("name".to_string()));

        let filter = filter.set_sort_reverse("severity");
        assert_eq!(
            filter.sort_state(),
            SortState::Descending("severity".to_string())
        );
        assert!(!filter.has("sort"));

        let filter = filter.set_sort("name");
        assert!(!filter.has("sort-reverse"));
        assert_eq!(filter.to_filter_string(), "sort=name");

        let filter = filter.clear_sort();
        assert_eq!(filter.sort_state(), SortState::Unsorted);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_with_sort_state_round_trips() {
        let state = SortState::Descending("created".to_string());
        let filter = Filter::from_string("sort=name").with_sort_state(&state);
        assert_eq!(filter.sort_state(), state);
        assert_eq!(filter.sort_field().as_deref(), Some("created"));
    }

    #[test]
    fn test_typed_accessors() {
        let filter = Filter::from_string("apply_overrides=1 levels=hm rows=25 min_qod=70 first=51");
        assert_eq!(filter.apply_overrides(), Some(true));
        assert_eq!(filter.rows(), Some(25));
        assert_eq!(filter.first(), Some(51));
        assert_eq!(filter.min_qod(), Some(70));
        let levels = filter.levels().unwrap();
        assert!(levels.contains(SeverityClass::High));
        assert!(!levels.contains(SeverityClass::Low));
    }

    #[test]
    fn test_ill_formed_values_read_as_absent() {
        let filter = Filter::from_string("rows=abc first=0 min_qod=150 apply_overrides=2 levels=xyz");
        assert_eq!(filter.rows(), None);
        assert_eq!(filter.first(), None);
        assert_eq!(filter.min_qod(), None);
        assert_eq!(filter.apply_overrides(), None);
        assert_eq!(filter.levels(), None);
        // still serialized as given
        assert_eq!(
            filter.to_filter_string(),
            "apply_overrides=2 levels=xyz rows=abc min_qod=150 first=0"
        );
    }

    #[test]
    fn test_typed_setters() {
        let levels = SeverityLevels::new()
            .with(SeverityClass::High)
            .with(SeverityClass::Medium);
        let filter = Filter::new()
            .set_first(0)
            .set_rows(10)
            .set_min_qod(250)
            .set_apply_overrides(false)
            .set_levels(&levels);
        assert_eq!(
            filter.to_filter_string(),
            "apply_overrides=0 levels=hm rows=10 min_qod=100 first=1"
        );
    }

    #[test]
    fn test_paging() {
        let filter = Filter::from_string("first=1 rows=10");
        let filter = filter.next_page();
        assert_eq!(filter.first(), Some(11));
        let filter = filter.next_page().previous_page();
        assert_eq!(filter.first(), Some(11));
        let filter = filter.previous_page().previous_page();
        assert_eq!(filter.first(), Some(1));
        let filter = filter.next_page().next_page().first_page();
        assert_eq!(filter.first(), Some(1));
    }

    #[test]
    fn test_paging_without_page_size_is_noop() {
        let filter = Filter::from_string("first=5");
        assert_eq!(filter.clone().next_page(), filter);
        let all = Filter::from_string("first=5 rows=10").all_rows();
        assert_eq!(all.to_filter_string(), "rows=0 first=1");
        assert_eq!(all.clone().next_page(), all);
    }
}
