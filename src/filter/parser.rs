use super::error::FilterError;
use super::lexer::{self, RawToken, Segment};
use super::term::{Relation, Term};

/// Split a raw token at its first unprotected operator.
///
/// A token without any operator becomes a bare keyword with `=` and an
/// empty value.
pub fn term_from_token(token: &RawToken) -> Result<Term, FilterError> {
    let mut keyword = String::new();
    let mut segments = token.segments.iter();

    while let Some(segment) = segments.next() {
        let bare = match segment {
            Segment::Literal(text) => {
                keyword.push_str(text);
                continue;
            }
            Segment::Bare(text) => text,
        };

        let Some((pos, relation)) = bare
            .char_indices()
            .find_map(|(i, c)| Relation::from_symbol(c).map(|r| (i, r)))
        else {
            keyword.push_str(bare);
            continue;
        };

        keyword.push_str(&bare[..pos]);
        let mut value = bare[pos + 1..].to_string();
        value.extend(segments.by_ref().map(Segment::as_str));
        return Term::new(&keyword, relation, value);
    }

    Term::new(&keyword, Relation::Equal, "")
}

/// Soft-failing variant of [`term_from_token`]: malformed tokens are logged
/// and dropped.
pub fn parse_token(token: &RawToken) -> Option<Term> {
    match term_from_token(token) {
        Ok(term) => Some(term),
        Err(err) => {
            tracing::debug!(token = %token.text(), error = %err, "dropping malformed filter token");
            None
        }
    }
}

/// Tokenize and parse a whole filter string into terms, in input order.
pub fn parse_terms(input: &str) -> Vec<Term> {
    lexer::tokenize(input)
        .iter()
        .filter_map(parse_token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_term(input: &str) -> Term {
        let terms = parse_terms(input);
        assert_eq!(terms.len(), 1, "expected one term from {input:?}");
        terms.into_iter().next().unwrap()
    }

    #[test]
    fn test_each_relation() {
        assert_eq!(only_term("a=1").relation(), Relation::Equal);
        assert_eq!(only_term("a~1").relation(), Relation::Approx);
        assert_eq!(only_term("a>1").relation(), Relation::Greater);
        assert_eq!(only_term("a<1").relation(), Relation::Less);
    }

    #[test]
    fn test_first_operator_splits() {
        let term = only_term("name=a=b");
        assert_eq!(term.keyword(), "name");
        assert_eq!(term.value(), "a=b");

        let term = only_term("severity>5<6");
        assert_eq!(term.relation(), Relation::Greater);
        assert_eq!(term.value(), "5<6");
    }

    #[test]
    fn test_quoted_value_is_not_resplit() {
        let term = only_term(r#"text~"x > y""#);
        assert_eq!(term.keyword(), "text");
        assert_eq!(term.relation(), Relation::Approx);
        assert_eq!(term.value(), "x > y");
    }

    #[test]
    fn test_escaped_operator_in_keyword_position_is_not_an_operator() {
        // the only operator is escaped, so `a=b` is all keyword
        assert!(parse_terms(r"a\=b").is_empty());
        let term = only_term(r"name=a\ b");
        assert_eq!(term.value(), "a b");
    }

    #[test]
    fn test_bare_keyword_gets_empty_equal() {
        let term = only_term("levels");
        assert_eq!(term.keyword(), "levels");
        assert_eq!(term.relation(), Relation::Equal);
        assert_eq!(term.value(), "");
    }

    #[test]
    fn test_missing_keyword_is_dropped() {
        assert!(parse_terms("=foo").is_empty());
        assert!(parse_terms("~").is_empty());
        assert_eq!(parse_terms("=foo rows=10").len(), 1);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let term = only_term("rows=");
        assert_eq!(term.keyword(), "rows");
        assert_eq!(term.value(), "");
    }

    #[test]
    fn test_malformed_tokens_do_not_stop_parsing() {
        let terms = parse_terms(r#"rows=5 ="oops" name~scan "unterminated value"#);
        let keywords: Vec<_> = terms.iter().map(Term::keyword).collect();
        assert_eq!(keywords, vec!["rows", "name"]);
    }

    #[test]
    fn test_term_from_token_reports_error() {
        let tokens = lexer::tokenize("=x");
        assert_eq!(term_from_token(&tokens[0]), Err(FilterError::EmptyKeyword));
    }
}
