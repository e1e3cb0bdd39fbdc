use super::keywords::MetaKeyword;
use super::parser;
use super::term::{Relation, Term};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A complete filter: singleton meta keywords plus repeatable criteria.
///
/// Meta terms are kept in a map keyed by [`MetaKeyword`], whose ordering is
/// the canonical serialization order. Criteria keep insertion order. At most
/// one of `sort` / `sort-reverse` is ever present.
///
/// Mutating methods take `self` and return the new filter. Clone (or
/// [`copy`](Filter::copy)) a shared filter before changing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    meta: BTreeMap<MetaKeyword, Term>,
    criteria: Vec<Term>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter string. Never fails; malformed tokens are dropped.
    ///
    /// Repeated meta keywords keep their last value. If both `sort` and
    /// `sort-reverse` appear, `sort-reverse` wins wherever it is placed,
    /// unless its value is empty, in which case `sort` is kept.
    pub fn from_string(input: &str) -> Self {
        let terms = parser::parse_terms(input);
        let last_value = |keyword: MetaKeyword| {
            terms
                .iter()
                .rev()
                .find(|t| t.meta_keyword() == Some(keyword))
                .map(Term::value)
        };
        let dropped = match (last_value(MetaKeyword::Sort), last_value(MetaKeyword::SortReverse)) {
            (Some(_), Some(reverse)) if !MetaKeyword::SortReverse.accepts(reverse) => {
                Some(MetaKeyword::SortReverse)
            }
            (Some(_), Some(_)) => Some(MetaKeyword::Sort),
            _ => None,
        };

        let mut filter = Filter::new();
        for term in terms {
            if dropped.is_some() && term.meta_keyword() == dropped {
                tracing::debug!(term = %term, "ignoring conflicting sort keyword");
                continue;
            }
            filter.insert(term);
        }
        filter
    }

    pub fn from_term(term: Term) -> Self {
        let mut filter = Filter::new();
        filter.insert(term);
        filter
    }

    /// Deep copy. Same as `clone()`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Meta terms in canonical order, then criteria in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.meta.values().chain(self.criteria.iter())
    }

    /// Meta terms in canonical order.
    pub fn meta_terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.meta.values()
    }

    pub fn criteria(&self) -> &[Term] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.meta.len() + self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.criteria.is_empty()
    }

    /// Canonical filter string; identical for identical filters.
    pub fn to_filter_string(&self) -> String {
        join_terms(self.terms())
    }

    /// Only the criteria, without pagination, sorting or other meta keywords.
    pub fn criteria_string(&self) -> String {
        join_terms(self.criteria.iter())
    }

    /// Only the meta keywords.
    pub fn meta_string(&self) -> String {
        join_terms(self.meta.values())
    }

    /// Combine with `other`.
    ///
    /// Meta keywords from `other` replace ours. Criteria from `other` are
    /// appended unless an identical term is already present.
    pub fn and(&self, other: &Filter) -> Filter {
        let mut merged = self.clone();
        for term in other.terms() {
            if term.is_meta() || !merged.criteria.contains(term) {
                merged.insert(term.clone());
            }
        }
        merged
    }

    /// Take meta keywords from `defaults` only where this filter has none.
    pub fn merge_meta(mut self, defaults: &Filter) -> Self {
        for (keyword, term) in &defaults.meta {
            let taken = self.meta.contains_key(keyword)
                || keyword
                    .exclusive_with()
                    .is_some_and(|other| self.meta.contains_key(&other));
            if !taken {
                self.meta.insert(*keyword, term.clone());
            }
        }
        self
    }

    /// Whether an identical term is already part of this filter.
    pub fn has_term(&self, term: &Term) -> bool {
        match term.meta_keyword() {
            Some(keyword) => self.meta.get(&keyword) == Some(term),
            None => self.criteria.contains(term),
        }
    }

    /// Whether any term uses `keyword`.
    pub fn has(&self, keyword: &str) -> bool {
        self.get_term(keyword).is_some()
    }

    /// The term for `keyword`: the singleton for meta keywords, the first
    /// match for criteria.
    pub fn get_term(&self, keyword: &str) -> Option<&Term> {
        let keyword = keyword.to_lowercase();
        match MetaKeyword::from_keyword(&keyword) {
            Some(meta) => self.meta.get(&meta),
            None => self.criteria.iter().find(|t| t.keyword() == keyword),
        }
    }

    /// Every term using `keyword`, in canonical order.
    pub fn get_all(&self, keyword: &str) -> Vec<&Term> {
        let keyword = keyword.to_lowercase();
        self.terms().filter(|t| t.keyword() == keyword).collect()
    }

    /// Raw value of `keyword`, unquoted.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.get_term(keyword).map(Term::value)
    }

    /// Value of `keyword` parsed as `T`, or `default` when it is missing or
    /// does not parse. Meta values must also pass the keyword's own check,
    /// so `first=0` or `rows=-5` read as missing whatever `T` is.
    pub fn get_or<T: FromStr>(&self, keyword: &str, default: T) -> T {
        let keyword = keyword.to_lowercase();
        let value = match MetaKeyword::from_keyword(&keyword) {
            Some(meta) => self.typed_value(meta),
            None => self.get(&keyword),
        };
        value
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    /// Set `keyword` to `value`.
    ///
    /// Meta keywords are replaced; criteria are appended (call
    /// [`delete`](Filter::delete) first to replace them). An invalid keyword
    /// leaves the filter unchanged.
    pub fn set(mut self, keyword: &str, value: impl Into<String>, relation: Relation) -> Self {
        match Term::new(keyword, relation, value) {
            Ok(term) => self.insert(term),
            Err(err) => tracing::warn!(keyword, error = %err, "not setting filter keyword"),
        }
        self
    }

    /// Add `term`, with the same replace/append rules as [`set`](Filter::set).
    pub fn with_term(mut self, term: Term) -> Self {
        self.insert(term);
        self
    }

    /// Remove every term using `keyword`.
    pub fn delete(mut self, keyword: &str) -> Self {
        let keyword = keyword.to_lowercase();
        match MetaKeyword::from_keyword(&keyword) {
            Some(meta) => {
                self.meta.remove(&meta);
            }
            None => self.criteria.retain(|t| t.keyword() != keyword),
        }
        self
    }

    /// Drop pagination and sorting, keeping criteria and the other meta
    /// keywords.
    pub fn simple(mut self) -> Self {
        self.meta.retain(|keyword, _| !keyword.is_paging());
        self
    }

    /// Equality that ignores the order of criteria.
    pub fn is_equivalent(&self, other: &Filter) -> bool {
        if self.meta != other.meta || self.criteria.len() != other.criteria.len() {
            return false;
        }
        sorted_criteria(self) == sorted_criteria(other)
    }

    pub(crate) fn insert(&mut self, term: Term) {
        match term.meta_keyword() {
            Some(keyword) => self.insert_meta(keyword, term),
            None => self.criteria.push(term),
        }
    }

    pub(crate) fn insert_meta(&mut self, keyword: MetaKeyword, term: Term) {
        if let Some(other) = keyword.exclusive_with() {
            self.meta.remove(&other);
        }
        self.meta.insert(keyword, term);
    }

    pub(crate) fn remove_meta(&mut self, keyword: MetaKeyword) {
        self.meta.remove(&keyword);
    }

    pub(crate) fn meta_term(&self, keyword: MetaKeyword) -> Option<&Term> {
        self.meta.get(&keyword)
    }
}

fn join_terms<'a>(terms: impl Iterator<Item = &'a Term>) -> String {
    terms
        .map(Term::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn sorted_criteria(filter: &Filter) -> Vec<(&str, char, &str)> {
    let mut keys: Vec<_> = filter
        .criteria
        .iter()
        .map(|t| (t.keyword(), t.relation().symbol(), t.value()))
        .collect();
    keys.sort_unstable();
    keys
}

impl From<Term> for Filter {
    fn from(term: Term) -> Self {
        Filter::from_term(term)
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Filter::from_string(s))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter_string())
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_filter_string())
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Filter::from_string(&raw))
    }
}
