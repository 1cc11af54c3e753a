use super::{Agent, Input, Interpretation};
use crate::ast::Statement;
use crate::error::NumbyError;
use crate::eval::{Context, Evaluator};

/// Terminal fallback. Never declines: input no agent could parse is
/// reported here as the single parse error of the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathAgent;

impl Agent for MathAgent {
    fn applies(&self, _statement: &Statement, _context: &Context) -> bool {
        true
    }

    fn try_interpret(&self, input: &Input, context: &mut Context) -> Interpretation {
        match input.statement {
            Ok(statement) => Evaluator::new()
                .eval_statement(statement, context, input.locale)
                .into(),
            Err(message) => Interpretation::Failed(NumbyError::parse(message.clone())),
        }
    }
}
