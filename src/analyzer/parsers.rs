//! Grammar of calculator statements over significant tokens.
//!
//! Statement-level structure (assignment prefix, conversion suffix) is
//! split off on the token slice first; the remaining body must parse as a
//! single expression.

use std::str::FromStr;

use super::{core::*, prelude::*};
use crate::ast::{BinaryOperator, Expression, Function, HistoryRef, Statement};
use crate::locale::LocaleSetting;
use crate::tokenizer::{
    keyword::Keyword,
    symbol::{Delimiter, Operator},
    token::Token,
};
use crate::units::scale_factor;

/// Parses one statement. Every token must be consumed.
#[tracing::instrument(level = "debug", skip(tokens, locale))]
pub fn parse_statement(tokens: &[Token], locale: &LocaleSetting) -> Result<Statement, ParseError> {
    let (assignment, rest, offset) = match tokens {
        [name, Token::Operator(Operator::Assign), rest @ ..] if name.word().is_some() => {
            (name.word().map(str::to_string), rest, 2)
        }
        _ => (None, tokens, 0),
    };

    let (body, conversion) = match rest {
        [head @ .., word, target] if !head.is_empty() && is_conversion_word(word, locale) => {
            match target.word() {
                Some(target) => (head, Some(target.to_string())),
                None => (rest, None),
            }
        }
        _ => (rest, None),
    };

    let (pos, expression) = parse_expression()
        .parse(body, 0)
        .map_err(|e| shift(e, offset))?;
    if let Some(token) = body.get(pos) {
        return Err(ParseError::Unexpected {
            found: token.to_string(),
            position: pos + offset,
        });
    }

    Ok(Statement {
        assignment,
        expression,
        conversion,
    })
}

fn is_conversion_word(token: &Token, locale: &LocaleSetting) -> bool {
    match token {
        Token::Keyword(keyword) => keyword.is_conversion(),
        Token::Identifier(word) => locale.is_conversion_word(word),
        _ => false,
    }
}

// positions are relative to the body; report them relative to the statement
fn shift(error: ParseError, offset: usize) -> ParseError {
    match error {
        ParseError::Unexpected { found, position } => ParseError::Unexpected {
            found,
            position: position + offset,
        },
        ParseError::WithContext { message, inner } => ParseError::WithContext {
            message,
            inner: Box::new(shift(*inner, offset)),
        },
        other => other,
    }
}

pub fn parse_expression() -> impl Parser<Token, Expression> {
    with_context(lazy(parse_additive), "expression")
}

fn parse_additive() -> impl Parser<Token, Expression> {
    map(
        pair(
            parse_multiplicative(),
            many(pair(parse_additive_operator(), parse_multiplicative())),
        ),
        |(first, rest)| fold_binary(first, rest),
    )
}

fn parse_multiplicative() -> impl Parser<Token, Expression> {
    map(
        pair(
            parse_power(),
            many(pair(parse_multiplicative_operator(), parse_power())),
        ),
        |(first, rest)| fold_binary(first, rest),
    )
}

fn fold_binary(first: Expression, rest: Vec<(BinaryOperator, Expression)>) -> Expression {
    rest.into_iter()
        .fold(first, |left, (op, right)| Expression::binary(op, left, right))
}

/// Right-associative: `2^3^2` is `2^(3^2)`. Boxed because it refers to
/// itself through `lazy`.
fn parse_power() -> Box<dyn Parser<Token, Expression>> {
    Box::new(map(
        pair(
            parse_unary(),
            optional(preceded(
                equal(Token::Operator(Operator::Power)),
                lazy(parse_power),
            )),
        ),
        |(base, exponent)| match exponent {
            Some(exponent) => Expression::binary(BinaryOperator::Power, base, exponent),
            None => base,
        },
    ))
}

fn parse_unary() -> impl Parser<Token, Expression> {
    map(
        pair(many(parse_sign()), parse_postfix()),
        |(signs, operand)| {
            signs.into_iter().rev().fold(operand, |expr, negative| {
                if negative {
                    Expression::Negate(Box::new(expr))
                } else {
                    expr
                }
            })
        },
    )
}

fn parse_sign() -> impl Parser<Token, bool> {
    satisfy(|token: &Token| match token {
        Token::Operator(Operator::Minus) => Some(true),
        Token::Operator(Operator::Plus) => Some(false),
        _ => None,
    })
}

/// `X%` and `X% of Y`. The base of `of` binds at power level, so
/// `10% of 50 + 5` adds 5 to the percentage.
fn parse_postfix() -> impl Parser<Token, Expression> {
    map(
        pair(
            parse_primary(),
            optional(pair(
                parse_percent_suffix(),
                optional(preceded(
                    equal(Token::Keyword(Keyword::Of)),
                    lazy(parse_power),
                )),
            )),
        ),
        |(value, percent)| match percent {
            None => value,
            Some((_, None)) => Expression::Percent(Box::new(value)),
            Some((_, Some(base))) => Expression::PercentOf {
                percent: Box::new(value),
                base: Box::new(base),
            },
        },
    )
}

/// A `%` not followed by an operand is a percent sign.
fn parse_percent_suffix() -> impl Parser<Token, Token> {
    terminated(
        equal(Token::Operator(Operator::Percent)),
        not(parse_operand_start()),
    )
}

fn parse_operand_start() -> impl Parser<Token, ()> {
    satisfy(|token: &Token| match token {
        Token::Number(_) | Token::Identifier(_) => Some(()),
        Token::Keyword(keyword) if keyword.is_history() => Some(()),
        Token::Delimiter(Delimiter::OpenParen) => Some(()),
        _ => None,
    })
}

fn parse_additive_operator() -> impl Parser<Token, BinaryOperator> {
    satisfy(|token: &Token| match token {
        Token::Operator(Operator::Plus) => Some(BinaryOperator::Add),
        Token::Operator(Operator::Minus) => Some(BinaryOperator::Subtract),
        _ => None,
    })
}

fn parse_multiplicative_operator() -> impl Parser<Token, BinaryOperator> {
    choice(vec![
        Box::new(satisfy(|token: &Token| match token {
            Token::Operator(Operator::Multiply) => Some(BinaryOperator::Multiply),
            Token::Operator(Operator::Divide) => Some(BinaryOperator::Divide),
            _ => None,
        })),
        Box::new(parse_modulo()),
    ])
}

/// A `%` followed by an operand is modulo.
fn parse_modulo() -> impl Parser<Token, BinaryOperator> {
    map(
        terminated(
            equal(Token::Operator(Operator::Percent)),
            peek(parse_operand_start()),
        ),
        |_| BinaryOperator::Modulo,
    )
}

fn parse_primary() -> impl Parser<Token, Expression> {
    choice(vec![
        Box::new(parse_quantity()),
        Box::new(parse_call()),
        Box::new(parse_history()),
        Box::new(parse_group()),
        Box::new(parse_variable()),
    ])
}

/// `5`, `5k`, `5 km`, `2 million USD`.
fn parse_quantity() -> impl Parser<Token, Expression> {
    map(
        pair(
            pair(parse_number(), optional(parse_scale())),
            optional(parse_unit_word()),
        ),
        |((number, scale), unit)| {
            with_unit(Expression::Number(number * scale.unwrap_or(1.0)), unit)
        },
    )
}

fn with_unit(value: Expression, unit: Option<String>) -> Expression {
    match unit {
        Some(unit) => Expression::Quantity {
            value: Box::new(value),
            unit,
        },
        None => value,
    }
}

fn parse_number() -> impl Parser<Token, f64> {
    satisfy(|token: &Token| match token {
        Token::Number(n) => Some(*n),
        _ => None,
    })
}

fn parse_scale() -> impl Parser<Token, f64> {
    satisfy(|token: &Token| match token {
        Token::Identifier(word) => scale_factor(word),
        _ => None,
    })
}

/// Unit or currency name after a value. `in` doubles as the inch symbol.
fn parse_unit_word() -> impl Parser<Token, String> {
    satisfy(|token: &Token| match token {
        Token::Identifier(word) if Function::from_str(word).is_err() => Some(word.clone()),
        Token::Keyword(Keyword::In) => Some(Keyword::In.to_string()),
        _ => None,
    })
}

fn parse_call() -> impl Parser<Token, Expression> {
    map(
        pair(
            satisfy(|token: &Token| match token {
                Token::Identifier(name) => Function::from_str(name).ok(),
                _ => None,
            }),
            delimited(
                equal(Token::Delimiter(Delimiter::OpenParen)),
                lazy(parse_expression),
                equal(Token::Delimiter(Delimiter::CloseParen)),
            ),
        ),
        |(function, argument)| Expression::Call {
            function,
            argument: Box::new(argument),
        },
    )
}

fn parse_history() -> impl Parser<Token, Expression> {
    satisfy(|token: &Token| match token {
        Token::Keyword(keyword) => HistoryRef::from_keyword(*keyword).map(Expression::History),
        _ => None,
    })
}

/// `(expr)` with an optional unit: `(2 + 3) km`.
fn parse_group() -> impl Parser<Token, Expression> {
    map(
        pair(
            delimited(
                equal(Token::Delimiter(Delimiter::OpenParen)),
                lazy(parse_expression),
                equal(Token::Delimiter(Delimiter::CloseParen)),
            ),
            optional(parse_unit_word()),
        ),
        |(inner, unit)| with_unit(inner, unit),
    )
}

fn parse_variable() -> impl Parser<Token, Expression> {
    satisfy(|token: &Token| match token {
        Token::Identifier(name) => Some(Expression::Variable(name.clone())),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LOCALES;
    use crate::tokenizer::token::tokenize_significant;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<Statement, ParseError> {
        let tokens = tokenize_significant(input).unwrap();
        parse_statement(&tokens, &LOCALES[0])
    }

    fn expr(input: &str) -> Expression {
        parse(input).unwrap().expression
    }

    fn num(n: f64) -> Expression {
        Expression::Number(n)
    }

    fn bin(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::binary(op, left, right)
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(
            expr("1 + 2 * 3"),
            bin(
                BinaryOperator::Add,
                num(1.0),
                bin(BinaryOperator::Multiply, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            expr("10 - 4 - 3"),
            bin(
                BinaryOperator::Subtract,
                bin(BinaryOperator::Subtract, num(10.0), num(4.0)),
                num(3.0)
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            expr("2 ^ 3 ^ 2"),
            bin(
                BinaryOperator::Power,
                num(2.0),
                bin(BinaryOperator::Power, num(3.0), num(2.0))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_tighter_than_power() {
        assert_eq!(
            expr("-2^2"),
            bin(
                BinaryOperator::Power,
                Expression::Negate(Box::new(num(2.0))),
                num(2.0)
            )
        );
        assert_eq!(
            expr("--3"),
            Expression::Negate(Box::new(Expression::Negate(Box::new(num(3.0)))))
        );
    }

    #[test]
    fn test_power_inside_percent_of() {
        assert_eq!(
            expr("10% of 2 ^ 3"),
            Expression::PercentOf {
                percent: Box::new(num(10.0)),
                base: Box::new(bin(BinaryOperator::Power, num(2.0), num(3.0))),
            }
        );
    }

    #[test]
    fn test_percent_suffix_and_modulo() {
        assert_eq!(
            expr("50 + 10%"),
            bin(
                BinaryOperator::Add,
                num(50.0),
                Expression::Percent(Box::new(num(10.0)))
            )
        );
        assert_eq!(
            expr("10 % 3"),
            bin(BinaryOperator::Modulo, num(10.0), num(3.0))
        );
    }

    #[test]
    fn test_percent_of_binds_at_power_level() {
        assert_eq!(
            expr("10% of 50 + 5"),
            bin(
                BinaryOperator::Add,
                Expression::PercentOf {
                    percent: Box::new(num(10.0)),
                    base: Box::new(num(50.0)),
                },
                num(5.0)
            )
        );
    }

    #[test]
    fn test_quantities_and_scales() {
        assert_eq!(
            expr("5 km"),
            Expression::Quantity {
                value: Box::new(num(5.0)),
                unit: "km".to_string()
            }
        );
        assert_eq!(expr("5k"), num(5000.0));
        assert_eq!(
            expr("2 million USD"),
            Expression::Quantity {
                value: Box::new(num(2e6)),
                unit: "USD".to_string()
            }
        );
        assert_eq!(
            expr("(2 + 3) m"),
            Expression::Quantity {
                value: Box::new(bin(BinaryOperator::Add, num(2.0), num(3.0))),
                unit: "m".to_string()
            }
        );
    }

    #[test]
    fn test_calls_and_history() {
        assert_eq!(
            expr("sqrt(16) + prev"),
            bin(
                BinaryOperator::Add,
                Expression::Call {
                    function: Function::Sqrt,
                    argument: Box::new(num(16.0)),
                },
                Expression::History(HistoryRef::Previous)
            )
        );
    }

    #[test]
    fn test_assignment_and_conversion() {
        let statement = parse("d = 5 km to m").unwrap();
        assert_eq!(statement.assignment.as_deref(), Some("d"));
        assert_eq!(statement.conversion.as_deref(), Some("m"));

        let statement = parse("12 in in cm").unwrap();
        assert_eq!(statement.conversion.as_deref(), Some("cm"));
        assert_eq!(
            statement.expression,
            Expression::Quantity {
                value: Box::new(num(12.0)),
                unit: "in".to_string()
            }
        );
    }

    #[test]
    fn test_locale_conversion_words() {
        let german = LOCALES.iter().find(|l| l.code == "de").unwrap();
        let word = german.conversion_words[0];
        let tokens = tokenize_significant(&format!("5 km {} m", word)).unwrap();
        let statement = parse_statement(&tokens, german).unwrap();
        assert_eq!(statement.conversion.as_deref(), Some("m"));
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        assert_eq!(
            parse("1 2"),
            Err(ParseError::Unexpected {
                found: "2".to_string(),
                position: 1
            })
        );
        assert!(parse("(1 + 2").is_err());
        assert!(parse("x =").is_err());
        assert!(parse("to km").is_err());
    }
}
