//! Syntax tree of a calculator statement.
//!
//! ```text
//! statement  := [name "="] expression [("to" | "in" | "as") target]
//! expression := additive
//! additive   := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := power (("*" | "/" | "%" operand) power)*
//! power      := unary ["^" power]
//! unary      := ("-" | "+")* postfix
//! postfix    := primary ["%" ["of" power]]
//! primary    := number [scale] [unit] | function "(" expression ")"
//!             | history | "(" expression ")" [unit] | name
//! ```

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::tokenizer::keyword::Keyword;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Variable bound by `name = ...`.
    pub assignment: Option<String>,
    pub expression: Expression,
    /// Unit or currency named after `to`/`in`/`as`.
    pub conversion: Option<String>,
}

impl Statement {
    pub fn expression(expression: Expression) -> Self {
        Self {
            assignment: None,
            expression,
            conversion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    /// A value followed by a word: a unit, currency, or implicit product
    /// with a variable (`2 x`).
    Quantity {
        value: Box<Expression>,
        unit: String,
    },
    Variable(String),
    History(HistoryRef),
    Negate(Box<Expression>),
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `X%`
    Percent(Box<Expression>),
    /// `X% of Y`
    PercentOf {
        percent: Box<Expression>,
        base: Box<Expression>,
    },
    Call {
        function: Function,
        argument: Box<Expression>,
    },
}

impl Expression {
    /// True if `predicate` holds for this node or any node below it.
    pub fn any(&self, predicate: &dyn Fn(&Expression) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match self {
            Expression::Number(_) | Expression::Variable(_) | Expression::History(_) => false,
            Expression::Quantity { value, .. } => value.any(predicate),
            Expression::Negate(inner) | Expression::Percent(inner) => inner.any(predicate),
            Expression::Binary { left, right, .. } => left.any(predicate) || right.any(predicate),
            Expression::PercentOf { percent, base } => {
                percent.any(predicate) || base.any(predicate)
            }
            Expression::Call { argument, .. } => argument.any(predicate),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOperator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "^")]
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HistoryRef {
    /// Most recent result (`prev`, `ans`).
    #[strum(serialize = "prev")]
    Previous,
    /// Sum of all results (`sum`, `total`).
    Sum,
    /// Mean of all results (`average`, `avg`).
    Average,
}

impl HistoryRef {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Prev | Keyword::Ans => Some(HistoryRef::Previous),
            Keyword::Sum | Keyword::Total => Some(HistoryRef::Sum),
            Keyword::Average | Keyword::Avg => Some(HistoryRef::Average),
            _ => None,
        }
    }
}

/// Built-in single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Function {
    Sqrt,
    Abs,
    Round,
    Floor,
    Ceil,
    Ln,
    Log,
    Log2,
    Exp,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl Function {
    /// Whether the result keeps the argument's unit.
    pub fn keeps_unit(self) -> bool {
        matches!(
            self,
            Function::Abs | Function::Round | Function::Floor | Function::Ceil
        )
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Abs => x.abs(),
            Function::Round => x.round(),
            Function::Floor => x.floor(),
            Function::Ceil => x.ceil(),
            Function::Ln => x.ln(),
            Function::Log => x.log10(),
            Function::Log2 => x.log2(),
            Function::Exp => x.exp(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_any_walks_the_tree() {
        let expr = Expression::binary(
            BinaryOperator::Add,
            Expression::Number(1.0),
            Expression::Percent(Box::new(Expression::Number(10.0))),
        );
        assert!(expr.any(&|e| matches!(e, Expression::Percent(_))));
        assert!(!expr.any(&|e| matches!(e, Expression::History(_))));
    }

    #[test]
    fn test_history_keywords() {
        assert_eq!(HistoryRef::from_keyword(Keyword::Ans), Some(HistoryRef::Previous));
        assert_eq!(HistoryRef::from_keyword(Keyword::Total), Some(HistoryRef::Sum));
        assert_eq!(HistoryRef::from_keyword(Keyword::To), None);
        assert_eq!(HistoryRef::Previous.to_string(), "prev");
        assert_eq!(HistoryRef::Average.to_string(), "average");
    }

    #[test]
    fn test_functions() {
        assert_eq!(Function::from_str("sqrt"), Ok(Function::Sqrt));
        assert!(Function::from_str("frobnicate").is_err());
        assert_eq!(Function::Sqrt.apply(16.0), 4.0);
        assert!(Function::Floor.keeps_unit());
        assert!(!Function::Sin.keeps_unit());
    }
}
