//! Filter string parsing, editing and canonical serialization
//!
//! A filter is a space-separated list of terms, each written as
//! `keyword<relation>value`. The backend evaluates the filter; this module
//! only reads, edits and writes it back.
//!
//! # Syntax
//!
//! ```text
//! keyword=value        Equal
//! keyword~value        Contains / approximately
//! keyword>value        Greater than
//! keyword<value        Less than
//! keyword="a b"        Quoted value, may contain spaces and = ~ > <
//! keyword="say \"hi\"" Backslash escapes " and \ inside quotes
//! keyword              Bare keyword, same as keyword=
//! ```
//!
//! # Meta keywords
//!
//! `apply_overrides`, `levels`, `rows`, `min_qod`, `first`, `sort` and
//! `sort-reverse` appear at most once and are written first, in that order.
//! `sort` and `sort-reverse` exclude each other. Every other keyword is a
//! criterion and may repeat.
//!
//! # Examples
//!
//! ```text
//! apply_overrides=0 levels=hml rows=10 first=1 sort-reverse=severity
//! name~scan tag="ssh server" severity>5.0
//! date>2024-01-01T00:00
//! ```

pub mod error;
pub mod expression;
pub mod keywords;
pub mod lexer;
pub mod pagination;
pub mod parser;
pub mod term;

pub use error::FilterError;
pub use expression::Filter;
pub use keywords::{MetaKeyword, SeverityClass, SeverityLevels};
pub use pagination::SortState;
pub use term::{Relation, Term, quote_value};
