use super::Agent;
use crate::ast::{Expression, Statement};
use crate::eval::Context;

/// Assignments and references to bound variables. Runs before the
/// generic agents so a bound name shadows constants like `e` or `pi`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableAgent;

impl Agent for VariableAgent {
    fn applies(&self, statement: &Statement, context: &Context) -> bool {
        statement.assignment.is_some()
            || statement.expression.any(&|e| match e {
                Expression::Variable(name) => context.has_variable(name),
                Expression::Quantity { unit, .. } => context.has_variable(unit),
                _ => false,
            })
    }
}
