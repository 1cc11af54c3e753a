use tracing::debug;

use super::arithmetic::Arithmetic;
use super::context::Context;
use crate::ast::{BinaryOperator, Expression, Function, HistoryRef, Statement};
use crate::error::{NumbyError, NumbyResult};
use crate::locale::LocaleSetting;
use crate::value::Value;

/// Names that resolve to a number when no variable of that name is bound.
pub const CONSTANTS: &[(&str, f64)] = &[("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

/// Evaluates expressions against a read-only view of a [`Context`].
pub struct ExpressionEvaluator<'a> {
    context: &'a Context,
    arithmetic: Arithmetic<'a>,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(context: &'a Context, locale: &'a LocaleSetting) -> Self {
        Self {
            context,
            arithmetic: Arithmetic::new(context.units(), context.rates(), locale),
        }
    }

    /// Value of the statement's expression, converted when the statement
    /// names a target. Assignment is left to the caller.
    pub fn eval_statement(&self, statement: &Statement) -> NumbyResult<Value> {
        let value = self.eval_expression(&statement.expression)?;
        match &statement.conversion {
            Some(target) => finite(self.arithmetic.convert_to(&value, target)?),
            None => Ok(value),
        }
    }

    pub fn eval_expression(&self, expression: &Expression) -> NumbyResult<Value> {
        let value = match expression {
            Expression::Number(n) => Value::number(*n),
            Expression::Quantity { value, unit } => self.eval_quantity(value, unit)?,
            Expression::Variable(name) => self.eval_variable(name)?,
            Expression::History(reference) => self.eval_history(*reference)?,
            Expression::Negate(inner) => self.arithmetic.negate(&self.eval_expression(inner)?),
            Expression::Binary { op, left, right } => self.eval_binary_op(*op, left, right)?,
            Expression::Percent(inner) => Value::number(self.eval_percent(inner)? / 100.0),
            Expression::PercentOf { percent, base } => {
                let percent = self.eval_percent(percent)?;
                let base = self.eval_expression(base)?;
                base.with_amount(base.amount * percent / 100.0)
            }
            Expression::Call { function, argument } => {
                self.eval_function_call(*function, argument)?
            }
        };
        finite(value)
    }

    /// `5 km` attaches a unit; `2 x` multiplies by a variable or constant.
    /// A bound variable shadows a unit of the same name.
    fn eval_quantity(&self, value: &Expression, word: &str) -> NumbyResult<Value> {
        let value = self.eval_expression(value)?;
        if let Some(bound) = self.context.variable(word) {
            return self.arithmetic.multiply(&value, bound);
        }
        if self.arithmetic.resolve_kind(word).is_some() {
            return self.arithmetic.convert_to(&value, word);
        }
        match self.lookup_name(word) {
            Some(factor) => self.arithmetic.multiply(&value, &factor),
            None => Err(NumbyError::parse(format!("unknown unit '{}'", word))),
        }
    }

    fn eval_variable(&self, name: &str) -> NumbyResult<Value> {
        self.lookup_name(name)
            .ok_or_else(|| NumbyError::UnknownVariable(name.to_string()))
    }

    fn lookup_name(&self, name: &str) -> Option<Value> {
        self.context
            .variable(name)
            .cloned()
            .or_else(|| constant(name).map(Value::number))
    }

    fn eval_history(&self, reference: HistoryRef) -> NumbyResult<Value> {
        let empty = || {
            NumbyError::UnknownHistoryReference(format!("'{}' with empty history", reference))
        };
        match reference {
            HistoryRef::Previous => self.context.last_result().cloned().ok_or_else(empty),
            HistoryRef::Sum => self.history_sum()?.ok_or_else(empty),
            HistoryRef::Average => {
                let sum = self.history_sum()?.ok_or_else(empty)?;
                let count = Value::number(self.context.history_count() as f64);
                self.arithmetic.divide(&sum, &count)
            }
        }
    }

    fn history_sum(&self) -> NumbyResult<Option<Value>> {
        let mut results = self.context.history().map(|entry| &entry.result);
        let Some(first) = results.next() else {
            return Ok(None);
        };
        results
            .try_fold(first.clone(), |sum, value| self.arithmetic.add(&sum, value))
            .map(Some)
    }

    fn eval_binary_op(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> NumbyResult<Value> {
        let left_val = self.eval_expression(left)?;

        // `A + X%` and `A - X%` scale A
        if let (BinaryOperator::Add | BinaryOperator::Subtract, Expression::Percent(percent)) =
            (op, right)
        {
            let percent = self.eval_percent(percent)? / 100.0;
            let factor = if op == BinaryOperator::Add {
                1.0 + percent
            } else {
                1.0 - percent
            };
            debug!("percentage adjustment by factor {}", factor);
            return Ok(left_val.with_amount(left_val.amount * factor));
        }

        let right_val = self.eval_expression(right)?;
        match op {
            BinaryOperator::Add => self.arithmetic.add(&left_val, &right_val),
            BinaryOperator::Subtract => self.arithmetic.subtract(&left_val, &right_val),
            BinaryOperator::Multiply => self.arithmetic.multiply(&left_val, &right_val),
            BinaryOperator::Divide => self.arithmetic.divide(&left_val, &right_val),
            BinaryOperator::Modulo => self.arithmetic.modulo(&left_val, &right_val),
            BinaryOperator::Power => self.arithmetic.power(&left_val, &right_val),
        }
    }

    /// The `X` of `X%`, which must be a plain number.
    fn eval_percent(&self, percent: &Expression) -> NumbyResult<f64> {
        let value = self.eval_expression(percent)?;
        if !value.is_number() {
            return Err(NumbyError::incompatible(format!(
                "a percentage needs a plain number, got {}",
                value
            )));
        }
        Ok(value.amount)
    }

    fn eval_function_call(&self, function: Function, argument: &Expression) -> NumbyResult<Value> {
        let argument = self.eval_expression(argument)?;
        if function.keeps_unit() {
            return Ok(argument.with_amount(function.apply(argument.amount)));
        }
        let argument = match function {
            Function::Sin | Function::Cos | Function::Tan => self.arithmetic.to_radians(&argument)?,
            _ => argument,
        };
        if !argument.is_number() {
            return Err(NumbyError::incompatible(format!(
                "{} needs a plain number, got {}",
                function, argument
            )));
        }
        Ok(Value::number(function.apply(argument.amount)))
    }
}

fn finite(value: Value) -> NumbyResult<Value> {
    if value.amount.is_finite() {
        Ok(value)
    } else {
        Err(NumbyError::NonFiniteResult)
    }
}
