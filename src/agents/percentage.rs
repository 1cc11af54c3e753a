use super::Agent;
use crate::ast::{Expression, Statement};
use crate::eval::Context;

#[derive(Debug, Default, Clone, Copy)]
pub struct PercentageAgent;

impl Agent for PercentageAgent {
    fn applies(&self, statement: &Statement, _context: &Context) -> bool {
        statement.expression.any(&|e| {
            matches!(e, Expression::Percent(_) | Expression::PercentOf { .. })
        })
    }
}
