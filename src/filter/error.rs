use thiserror::Error;

/// Errors raised when a term is built explicitly from parts or from a single
/// term string. Parsing a whole filter string never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Empty filter keyword")]
    EmptyKeyword,

    #[error("Invalid filter keyword: '{0}'. Keywords may not contain whitespace, quotes, backslashes or any of = ~ > <")]
    InvalidKeyword(String),

    #[error("Unknown relation: '{0}'. Valid relations are: = ~ > <")]
    UnknownRelation(String),

    #[error("Invalid filter term: {0}")]
    InvalidTerm(String),
}
