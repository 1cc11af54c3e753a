use thiserror::Error;

/// A parser over a slice of `I`, starting at `pos`. On success returns the
/// position after the consumed input together with the parsed value.
pub trait Parser<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

impl<I, O, P: Parser<I, O> + ?Sized> Parser<I, O> for Box<P> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        (**self).parse(input, pos)
    }
}

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected '{found}' at token {position}")]
    Unexpected { found: String, position: usize },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("no alternative matched")]
    NoAlternative,
    #[error("{0}")]
    Fail(String),
    #[error("{message}: {inner}")]
    WithContext {
        message: String,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    /// Innermost error, without context wrappers.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }
}
