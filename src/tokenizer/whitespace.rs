use nom::{bytes::complete::take_while1, combinator::map, error::context};

use super::token::{ParserResult, Token};

/// Parses a run of whitespace, keeping its exact content.
///
/// Input is a single logical line, so line breaks are ordinary whitespace
/// and non-breaking spaces (common in pasted French or Russian numbers)
/// are accepted too.
///
/// # Examples
///
/// ```
/// # use numby::tokenizer::whitespace::parse_whitespace;
/// # use numby::tokenizer::token::Token;
/// let (rest, token) = parse_whitespace(" \t5").unwrap();
/// assert_eq!(token, Token::Whitespace(" \t".to_string()));
/// assert_eq!(rest, "5");
/// ```
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<'_, Token> {
    context(
        "whitespace expected",
        map(take_while1(char::is_whitespace), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        let (rest, token) = parse_whitespace("   hello").unwrap();
        assert_eq!(token, Token::Whitespace("   ".to_string()));
        assert_eq!(rest, "hello");

        let (rest, token) = parse_whitespace("\u{a0}\n1").unwrap();
        assert_eq!(token, Token::Whitespace("\u{a0}\n".to_string()));
        assert_eq!(rest, "1");
    }

    #[test]
    fn test_error() {
        assert!(parse_whitespace("hello").is_err());
        assert!(parse_whitespace("").is_err());
    }
}
