use tracing::debug;

use super::context::{validate_identifier, Context};
use super::expression::ExpressionEvaluator;
use crate::ast::Statement;
use crate::error::NumbyResult;
use crate::locale::LocaleSetting;
use crate::value::Value;

/// Top-level statement evaluation shared by every agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `statement` and performs its assignment, if any. The
    /// context is only modified once the value is known.
    pub fn eval_statement(
        &self,
        statement: &Statement,
        context: &mut Context,
        locale: &LocaleSetting,
    ) -> NumbyResult<Value> {
        if let Some(name) = &statement.assignment {
            validate_identifier(name)?;
        }
        let value = ExpressionEvaluator::new(context, locale).eval_statement(statement)?;
        if let Some(name) = &statement.assignment {
            debug!("assignment to {}", name);
            context.set_variable(name, value.clone())?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parse_statement;
    use crate::error::ErrorKind;
    use crate::locale::LOCALES;
    use crate::tokenizer::token::tokenize_significant;

    fn run(ctx: &mut Context, input: &str) -> NumbyResult<Value> {
        let tokens = tokenize_significant(input).unwrap();
        let statement = parse_statement(&tokens, &LOCALES[0]).unwrap();
        Evaluator::new().eval_statement(&statement, ctx, &LOCALES[0])
    }

    #[test]
    fn test_assignment_binds_after_evaluation() {
        let mut ctx = Context::new();
        assert_eq!(run(&mut ctx, "x = 12.5").unwrap(), Value::number(12.5));
        assert_eq!(ctx.variable("x"), Some(&Value::number(12.5)));
        assert_eq!(run(&mut ctx, "y = x * 2 km").unwrap(), Value::unit(25.0, "km"));
    }

    #[test]
    fn test_failed_assignment_leaves_context_alone() {
        let mut ctx = Context::new();
        assert_eq!(
            run(&mut ctx, "x = 1 / 0").unwrap_err().kind(),
            ErrorKind::DivisionByZero
        );
        assert!(!ctx.has_variable("x"));
        assert_eq!(
            run(&mut ctx, "prev = 5").unwrap_err().kind(),
            ErrorKind::InvalidName
        );
    }
}
