use super::error::FilterError;
use super::keywords::MetaKeyword;
use super::{lexer, parser};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Relation between a keyword and its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Relation {
    #[default]
    Equal,
    Approx,
    Greater,
    Less,
}

impl Relation {
    pub fn symbol(&self) -> char {
        match self {
            Relation::Equal => '=',
            Relation::Approx => '~',
            Relation::Greater => '>',
            Relation::Less => '<',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '=' => Some(Relation::Equal),
            '~' => Some(Relation::Approx),
            '>' => Some(Relation::Greater),
            '<' => Some(Relation::Less),
            _ => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Relation {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Relation::from_symbol(c).ok_or_else(|| FilterError::UnknownRelation(s.to_string()))
            }
            _ => Err(FilterError::UnknownRelation(s.to_string())),
        }
    }
}

impl Serialize for Relation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// True for characters that force a value into quotes.
fn needs_quoting(c: char) -> bool {
    c.is_whitespace() || c == '"' || c == '\\' || Relation::from_symbol(c).is_some()
}

/// Quote `value` for the filter string if it would otherwise be split or
/// misread. Embedded `"` and `\` are backslash-escaped inside the quotes.
pub fn quote_value(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_quoting) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// A single `keyword<relation>value` constraint.
///
/// The keyword is stored lower-cased; the value is kept verbatim and only
/// interpreted by the typed accessors on [`Filter`](super::Filter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Term {
    keyword: String,
    relation: Relation,
    value: String,
}

impl Term {
    /// Build a term from parts, validating the keyword.
    pub fn new(
        keyword: impl AsRef<str>,
        relation: Relation,
        value: impl Into<String>,
    ) -> Result<Self, FilterError> {
        let keyword = normalize_keyword(keyword.as_ref())?;
        Ok(Term {
            keyword,
            relation,
            value: value.into(),
        })
    }

    pub(crate) fn meta(keyword: MetaKeyword, value: impl Into<String>) -> Self {
        Term {
            keyword: keyword.as_str().to_string(),
            relation: Relation::Equal,
            value: value.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn meta_keyword(&self) -> Option<MetaKeyword> {
        MetaKeyword::from_keyword(&self.keyword)
    }

    pub fn is_meta(&self) -> bool {
        self.meta_keyword().is_some()
    }

    /// Canonical `keyword<op>value` form with the value quoted as needed.
    pub fn to_term_string(&self) -> String {
        self.to_string()
    }
}

/// Lower-case `keyword` and check it can be written back unquoted.
pub(crate) fn normalize_keyword(keyword: &str) -> Result<String, FilterError> {
    if keyword.is_empty() {
        return Err(FilterError::EmptyKeyword);
    }
    if keyword.chars().any(needs_quoting) {
        return Err(FilterError::InvalidKeyword(keyword.to_string()));
    }
    Ok(keyword.to_lowercase())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.keyword,
            self.relation,
            quote_value(&self.value)
        )
    }
}

impl FromStr for Term {
    type Err = FilterError;

    /// Parse exactly one term, e.g. `"date>2024-01-01T00:00".parse::<Term>()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lexer::tokenize(s);
        match tokens.as_slice() {
            [token] => parser::term_from_token(token),
            [] => Err(FilterError::InvalidTerm("empty input".to_string())),
            _ => Err(FilterError::InvalidTerm(format!(
                "expected a single term, got {} in '{}'",
                tokens.len(),
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_term_string() {
        let term: Term = "date>2024-01-01T00:00".parse().unwrap();
        assert_eq!(term.keyword(), "date");
        assert_eq!(term.relation(), Relation::Greater);
        assert_eq!(term.value(), "2024-01-01T00:00");
    }

    #[test]
    fn test_keyword_is_lowercased_value_is_not() {
        let term = Term::new("Name", Relation::Approx, "Foo").unwrap();
        assert_eq!(term.keyword(), "name");
        assert_eq!(term.value(), "Foo");
        assert_eq!(term, "NAME~Foo".parse::<Term>().unwrap());
        assert_ne!(term, "name~foo".parse::<Term>().unwrap());
    }

    #[test]
    fn test_invalid_keywords_are_rejected() {
        assert_eq!(Term::new("", Relation::Equal, "x"), Err(FilterError::EmptyKeyword));
        assert!(matches!(
            Term::new("a b", Relation::Equal, "x"),
            Err(FilterError::InvalidKeyword(_))
        ));
        assert!(matches!(
            Term::new("a=b", Relation::Equal, "x"),
            Err(FilterError::InvalidKeyword(_))
        ));
    }

    #[test]
    fn test_display_quotes_only_when_needed() {
        let plain = Term::new("name", Relation::Equal, "scanner").unwrap();
        assert_eq!(plain.to_string(), "name=scanner");

        let spaced = Term::new("text", Relation::Approx, "hello world").unwrap();
        assert_eq!(spaced.to_string(), r#"text~"hello world""#);

        let operator = Term::new("name", Relation::Equal, "a<b").unwrap();
        assert_eq!(operator.to_string(), r#"name="a<b""#);

        let empty = Term::new("levels", Relation::Equal, "").unwrap();
        assert_eq!(empty.to_string(), "levels=");
    }

    #[test]
    fn test_quote_value_escapes_quotes_and_backslashes() {
        assert_eq!(quote_value(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote_value(r"C:\temp"), r#""C:\\temp""#);
    }

    #[test]
    fn test_term_string_matches_display() {
        let term = Term::new("Name", Relation::Approx, "OpenSSH server").unwrap();
        assert_eq!(term.to_term_string(), r#"name~"OpenSSH server""#);
        assert_eq!(term.to_term_string(), term.to_string());
    }

    #[test]
    fn test_display_then_parse_preserves_term() {
        let term = Term::new("comment", Relation::Equal, r#"a "quoted" \ value=1"#).unwrap();
        let reparsed: Term = term.to_string().parse().unwrap();
        assert_eq!(reparsed, term);
    }

    #[test]
    fn test_from_str_rejects_multiple_terms() {
        assert!(matches!(
            "rows=1 first=1".parse::<Term>(),
            Err(FilterError::InvalidTerm(_))
        ));
        assert!("".parse::<Term>().is_err());
    }

    #[test]
    fn test_relation_from_str() {
        assert_eq!("~".parse::<Relation>(), Ok(Relation::Approx));
        assert!(matches!(
            ">=".parse::<Relation>(),
            Err(FilterError::UnknownRelation(_))
        ));
    }

    #[test]
    fn test_relation_serializes_as_symbol() {
        let term = Term::new("severity", Relation::Greater, "5.0").unwrap();
        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"keyword": "severity", "relation": ">", "value": "5.0"})
        );
    }
}
