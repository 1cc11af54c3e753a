//! Unit-aware arithmetic over [`Value`]s.
//!
//! Plain numbers mix freely with quantities and take on the quantity's
//! unit (`5 km + 3` is `8 km`). Two quantities must share a category; the
//! right operand is converted into the left operand's unit first.

use crate::error::{NumbyError, NumbyResult};
use crate::locale::LocaleSetting;
use crate::units::currency::{resolve_code, CurrencyRateSet};
use crate::units::{convert_between, Category, UnitDef, UnitTable};
use crate::value::{Value, ValueKind};

pub struct Arithmetic<'a> {
    units: &'a UnitTable,
    rates: Option<&'a CurrencyRateSet>,
    locale: &'a LocaleSetting,
}

impl<'a> Arithmetic<'a> {
    pub fn new(
        units: &'a UnitTable,
        rates: Option<&'a CurrencyRateSet>,
        locale: &'a LocaleSetting,
    ) -> Self {
        Self {
            units,
            rates,
            locale,
        }
    }

    /// Resolves a unit or currency word to a value kind. Units win over
    /// currencies.
    pub fn resolve_kind(&self, word: &str) -> Option<ValueKind> {
        if let Some(unit) = self.units.lookup_in(word, self.locale) {
            return Some(ValueKind::Unit(unit.symbol.clone()));
        }
        resolve_code(word, self.rates).map(ValueKind::Currency)
    }

    pub fn add(&self, left: &Value, right: &Value) -> NumbyResult<Value> {
        self.combine(left, right, "add", |l, r| l + r)
    }

    pub fn subtract(&self, left: &Value, right: &Value) -> NumbyResult<Value> {
        self.combine(left, right, "subtract", |l, r| l - r)
    }

    pub fn multiply(&self, left: &Value, right: &Value) -> NumbyResult<Value> {
        match (&left.kind, &right.kind) {
            (ValueKind::Number, _) => Ok(right.with_amount(left.amount * right.amount)),
            (_, ValueKind::Number) => Ok(left.with_amount(left.amount * right.amount)),
            _ => Err(NumbyError::incompatible(format!(
                "cannot multiply {} by {}",
                left.unit_label(),
                right.unit_label()
            ))),
        }
    }

    /// Zero is judged after unit conversion: `0 C` is not a zero divisor
    /// for kelvin.
    pub fn divide(&self, left: &Value, right: &Value) -> NumbyResult<Value> {
        match (&left.kind, &right.kind) {
            (_, ValueKind::Number) if right.amount == 0.0 => Err(NumbyError::DivisionByZero),
            (_, ValueKind::Number) => Ok(left.with_amount(left.amount / right.amount)),
            (ValueKind::Number, _) => Err(NumbyError::incompatible(format!(
                "cannot divide a number by {}",
                right.unit_label()
            ))),
            // same-category quotient is a plain ratio
            _ => {
                let right = self.convert_kind(right, &left.kind)?;
                if right == 0.0 {
                    return Err(NumbyError::DivisionByZero);
                }
                Ok(Value::number(left.amount / right))
            }
        }
    }

    /// Remainder with the sign of the dividend.
    pub fn modulo(&self, left: &Value, right: &Value) -> NumbyResult<Value> {
        match (&left.kind, &right.kind) {
            (_, ValueKind::Number) if right.amount == 0.0 => Err(NumbyError::DivisionByZero),
            (_, ValueKind::Number) => Ok(left.with_amount(left.amount % right.amount)),
            (ValueKind::Number, _) => Err(NumbyError::incompatible(format!(
                "cannot take a number modulo {}",
                right.unit_label()
            ))),
            _ => {
                let right = self.convert_kind(right, &left.kind)?;
                if right == 0.0 {
                    return Err(NumbyError::DivisionByZero);
                }
                Ok(left.with_amount(left.amount % right))
            }
        }
    }

    pub fn power(&self, base: &Value, exponent: &Value) -> NumbyResult<Value> {
        if !(base.is_number() && exponent.is_number()) {
            return Err(NumbyError::incompatible(
                "exponentiation needs plain numbers",
            ));
        }
        Ok(Value::number(base.amount.powf(exponent.amount)))
    }

    pub fn negate(&self, value: &Value) -> Value {
        value.with_amount(-value.amount)
    }

    /// Converts `value` to the unit or currency named `target`. A plain
    /// number simply takes on the target.
    pub fn convert_to(&self, value: &Value, target: &str) -> NumbyResult<Value> {
        let kind = self
            .resolve_kind(target)
            .ok_or_else(|| NumbyError::parse(format!("unknown unit '{}'", target)))?;
        if value.is_number() {
            return Ok(Value {
                amount: value.amount,
                kind,
            });
        }
        let amount = self.convert_kind(value, &kind)?;
        Ok(Value { amount, kind })
    }

    /// Converts an angle to radians; any other value is returned as is.
    pub fn to_radians(&self, value: &Value) -> NumbyResult<Value> {
        match &value.kind {
            ValueKind::Unit(symbol) if self.unit(symbol)?.category == Category::Angle => {
                self.convert_to(value, "rad").map(|v| Value::number(v.amount))
            }
            _ => Ok(value.clone()),
        }
    }

    fn combine(
        &self,
        left: &Value,
        right: &Value,
        verb: &str,
        op: impl Fn(f64, f64) -> f64,
    ) -> NumbyResult<Value> {
        match (&left.kind, &right.kind) {
            (ValueKind::Number, _) => Ok(right.with_amount(op(left.amount, right.amount))),
            (_, ValueKind::Number) => Ok(left.with_amount(op(left.amount, right.amount))),
            _ => {
                let right_amount = self.convert_kind(right, &left.kind).map_err(|e| match e {
                    NumbyError::IncompatibleUnits(_) => NumbyError::incompatible(format!(
                        "cannot {} {} and {}",
                        verb,
                        left.unit_label(),
                        right.unit_label()
                    )),
                    other => other,
                })?;
                Ok(left.with_amount(op(left.amount, right_amount)))
            }
        }
    }

    /// Amount of `value` expressed in `target`.
    fn convert_kind(&self, value: &Value, target: &ValueKind) -> NumbyResult<f64> {
        match (&value.kind, target) {
            (ValueKind::Number, _) => Ok(value.amount),
            (ValueKind::Unit(from), ValueKind::Unit(to)) => {
                convert_between(value.amount, self.unit(from)?, self.unit(to)?)
            }
            (ValueKind::Currency(from), ValueKind::Currency(to)) => {
                if from == to {
                    return Ok(value.amount);
                }
                let rates = self
                    .rates
                    .ok_or_else(|| NumbyError::MissingRate(from.clone()))?;
                rates.convert(value.amount, from, to)
            }
            _ => Err(NumbyError::incompatible(format!(
                "cannot convert {} to {}",
                value.unit_label(),
                match target {
                    ValueKind::Number => "a number",
                    ValueKind::Unit(label) | ValueKind::Currency(label) => label,
                }
            ))),
        }
    }

    fn unit(&self, symbol: &str) -> NumbyResult<&'a UnitDef> {
        self.units
            .get(symbol)
            .ok_or_else(|| NumbyError::parse(format!("unknown unit '{}'", symbol)))
    }
}
