use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit1, hex_digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    error::context,
    sequence::{pair, preceded, tuple},
};

use super::token::{ParserResult, Token};

#[tracing::instrument(level = "debug", skip(input))]
fn parse_hex(input: &str) -> ParserResult<'_, f64> {
    context(
        "hex literal",
        map_res(preceded(tag_no_case("0x"), hex_digit1), |digits: &str| {
            u64::from_str_radix(digits, 16).map(|n| n as f64)
        }),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_binary(input: &str) -> ParserResult<'_, f64> {
    context(
        "binary literal",
        map_res(
            preceded(
                tag_no_case("0b"),
                take_while1(|c: char| c == '0' || c == '1'),
            ),
            |digits: &str| u64::from_str_radix(digits, 2).map(|n| n as f64),
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_octal(input: &str) -> ParserResult<'_, f64> {
    context(
        "octal literal",
        map_res(
            preceded(
                tag_no_case("0o"),
                take_while1(|c: char| ('0'..='7').contains(&c)),
            ),
            |digits: &str| u64::from_str_radix(digits, 8).map(|n| n as f64),
        ),
    )(input)
}

/// `12`, `12.5`, `.5`, `1.5e3`, `2E-4`
#[tracing::instrument(level = "debug", skip(input))]
fn parse_decimal(input: &str) -> ParserResult<'_, f64> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt(tuple((one_of("eE"), opt(one_of("+-")), digit1)));
    context(
        "decimal literal",
        map_res(recognize(pair(mantissa, exponent)), |s: &str| {
            s.parse::<f64>()
        }),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_number(input: &str) -> ParserResult<'_, Token> {
    context(
        "number",
        map(
            alt((parse_hex, parse_binary, parse_octal, parse_decimal)),
            Token::Number,
        ),
    )(input)
}
