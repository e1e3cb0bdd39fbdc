//! Splits a filter string into raw tokens.
//!
//! Each token keeps track of which parts of its text were written bare and
//! which were protected by quotes or a backslash escape, so that the term
//! parser only ever splits on operators the user actually typed unprotected.

/// One contiguous piece of a raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unquoted, unescaped text. Operators inside it are significant.
    Bare(String),
    /// Text taken from a quoted run or a backslash escape. Never split.
    Literal(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Bare(s) | Segment::Literal(s) => s,
        }
    }
}

/// A whitespace-delimited token, with quotes already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawToken {
    pub segments: Vec<Segment>,
}

impl RawToken {
    /// The token's text with quoting and escapes resolved.
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::as_str).collect()
    }

    fn push_bare(&mut self, c: char) {
        match self.segments.last_mut() {
            Some(Segment::Bare(s)) => s.push(c),
            _ => self.segments.push(Segment::Bare(c.to_string())),
        }
    }

    fn push_literal(&mut self, c: char) {
        match self.segments.last_mut() {
            Some(Segment::Literal(s)) => s.push(c),
            _ => self.segments.push(Segment::Literal(c.to_string())),
        }
    }

    /// Opens an empty literal segment so that `""` still yields a token.
    fn open_literal(&mut self) {
        if !matches!(self.segments.last(), Some(Segment::Literal(_))) {
            self.segments.push(Segment::Literal(String::new()));
        }
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Tokenize a filter string.
///
/// Never fails: an unterminated quote swallows the rest of the input and a
/// trailing lone backslash is kept as a literal backslash.
pub fn tokenize(input: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut current = RawToken::default();
    let mut chars = input.chars();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push_literal(escaped),
                None => current.push_literal('\\'),
            },
            '"' => {
                in_quotes = !in_quotes;
                if in_quotes {
                    current.open_literal();
                }
            }
            c if in_quotes => current.push_literal(c),
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push_bare(c),
        }
    }

    if in_quotes {
        tracing::trace!(input, "unterminated quote, taking rest of input as value");
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
