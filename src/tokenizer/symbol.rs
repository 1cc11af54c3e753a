//! # Operators and Delimiters
//!
//! Longer operators are matched first so `**` is read as power rather
//! than two multiplications.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    /// Exponentiation, written `^` or `**`.
    #[strum(serialize = "^")]
    Power,
    /// Percent suffix or modulo, decided by the parser.
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "=")]
    Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    #[strum(serialize = "(")]
    OpenParen,
    #[strum(serialize = ")")]
    CloseParen,
}

/// Parses an operator.
///
/// # Examples
///
/// ```
/// # use numby::tokenizer::symbol::{parse_operator, Operator};
/// # use numby::tokenizer::token::Token;
/// let (rest, token) = parse_operator("** 2").unwrap();
/// assert_eq!(token, Token::Operator(Operator::Power));
/// assert_eq!(rest, " 2");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<'_, Token> {
    context(
        "operator",
        map(
            alt((
                value(Operator::Power, tag("**")),
                value(Operator::Plus, tag("+")),
                value(Operator::Minus, tag("-")),
                value(Operator::Multiply, tag("*")),
                value(Operator::Divide, tag("/")),
                value(Operator::Power, tag("^")),
                value(Operator::Percent, tag("%")),
                value(Operator::Assign, tag("=")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<'_, Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
            )),
            Token::Delimiter,
        ),
    )(input)
}
