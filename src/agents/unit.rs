use super::Agent;
use crate::ast::{Expression, Statement};
use crate::eval::Context;

/// Quantities with units or currencies, and explicit conversions.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitAgent;

impl Agent for UnitAgent {
    fn applies(&self, statement: &Statement, _context: &Context) -> bool {
        statement.conversion.is_some()
            || statement
                .expression
                .any(&|e| matches!(e, Expression::Quantity { .. }))
    }
}
