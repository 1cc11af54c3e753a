use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    combinator::recognize,
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use thiserror::Error;

use super::{
    keyword::Keyword,
    literal::parse_number,
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::parse_whitespace,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    Keyword(Keyword),
    Operator(Operator),
    Delimiter(Delimiter),
    Whitespace(String),
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    /// Word form of identifiers and keywords.
    pub fn word(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::Keyword(keyword) => Some(keyword.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Keyword(keyword) => write!(f, "{}", keyword),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Delimiter(delimiter) => write!(f, "{}", delimiter),
            Token::Whitespace(ws) => write!(f, "{}", ws),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_column: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_column: 1, // 1-based
        }
    }

    #[tracing::instrument(level = "debug", skip(input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start_position = self.current_position;
            let start_column = self.current_column;

            let result = alt((
                parse_whitespace,
                parse_number,
                parse_operator,
                parse_delimiter,
                parse_word,
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    tokens.push(TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                        column: start_column,
                    });

                    remaining = new_remaining;
                }
                Err(e) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    let span = Span {
                        start: self.current_position,
                        end: self.current_position
                            + remaining.chars().next().map_or(1, char::len_utf8),
                        column: self.current_column,
                    };
                    let message = match e {
                        nom::Err::Incomplete(needed) => format!("incomplete input, {:?}", needed),
                        nom::Err::Error(e) | nom::Err::Failure(e) => {
                            nom::error::convert_error(remaining, e)
                        }
                    };
                    let error = TokenizerError::UnexpectedCharacter {
                        message,
                        found,
                        span,
                    };
                    tracing::debug!("{}", error);
                    return Err(error);
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            self.current_column += 1;
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenizes a whole input and strips whitespace.
pub fn tokenize_significant(input: &str) -> TokenizerResult<Vec<Token>> {
    Ok(Tokenizer::new()
        .tokenize(input)?
        .into_iter()
        .map(|span| span.token)
        .filter(|token| !token.is_whitespace())
        .collect())
}

#[derive(Debug, Clone)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {} (bytes {}..{})", self.column, self.start, self.end)
    }
}

/// Identifiers, with keywords split out.
#[tracing::instrument(level = "debug", skip(input))]
fn parse_word(input: &str) -> ParserResult<'_, Token> {
    let (input, word) = context(
        "identifier",
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
    )(input)?;

    if let Ok(keyword) = Keyword::try_from(word) {
        return Ok((input, Token::Keyword(keyword)));
    }

    Ok((input, Token::Identifier(word.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("unexpected '{found}' at {span}")]
    UnexpectedCharacter {
        message: String,
        found: String,
        span: Span,
    },
}
