use super::Agent;
use crate::ast::{Expression, Statement};
use crate::eval::Context;

/// Recalls earlier results. An empty history is a definite failure, not
/// a reason to fall through.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryAgent;

impl Agent for HistoryAgent {
    fn applies(&self, statement: &Statement, _context: &Context) -> bool {
        statement
            .expression
            .any(&|e| matches!(e, Expression::History(_)))
    }
}
