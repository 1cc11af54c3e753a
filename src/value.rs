use serde::{Deserialize, Serialize};
use std::fmt;

/// What an amount measures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum ValueKind {
    #[default]
    Number,
    /// Canonical unit symbol, e.g. `km`.
    Unit(String),
    /// Upper-case currency code, e.g. `EUR`.
    Currency(String),
}

/// Result of an evaluation. The amount is always finite.
#[derive(Clone, Debug, PartialEq, Default, Deserialize, Serialize)]
pub struct Value {
    pub amount: f64,
    pub kind: ValueKind,
}

impl Value {
    pub fn number(amount: f64) -> Self {
        Self {
            amount,
            kind: ValueKind::Number,
        }
    }

    pub fn unit(amount: f64, symbol: impl Into<String>) -> Self {
        Self {
            amount,
            kind: ValueKind::Unit(symbol.into()),
        }
    }

    pub fn currency(amount: f64, code: impl Into<String>) -> Self {
        Self {
            amount,
            kind: ValueKind::Currency(code.into()),
        }
    }

    /// Same kind, different amount.
    pub fn with_amount(&self, amount: f64) -> Self {
        Self {
            amount,
            kind: self.kind.clone(),
        }
    }

    pub fn is_number(&self) -> bool {
        self.kind == ValueKind::Number
    }

    /// Unit symbol or currency code, empty for plain numbers.
    pub fn unit_label(&self) -> &str {
        match &self.kind {
            ValueKind::Number => "",
            ValueKind::Unit(symbol) => symbol,
            ValueKind::Currency(code) => code,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number => write!(f, "{}", self.amount),
            ValueKind::Unit(label) | ValueKind::Currency(label) => {
                write!(f, "{} {}", self.amount, label)
            }
        }
    }
}
