use serde::Serialize;
use tracing::{debug, instrument};

use super::{AgentKind, Input, Interpretation};
use crate::analyzer::parse_statement;
use crate::ast::Statement;
use crate::error::{NumbyError, NumbyResult};
use crate::eval::Context;
use crate::formatter::{FormatterConfig, ValueFormatter};
use crate::locale::{self, LocaleSetting};
use crate::preprocessor::Preprocessor;
use crate::tokenizer::{
    symbol::{Delimiter, Operator},
    token::{tokenize_significant, Token},
};
use crate::value::Value;

/// Longest accepted input, in bytes.
pub const MAX_EXPR_LENGTH: usize = 100_000;

/// Deepest accepted parenthesis nesting.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Most operators accepted in one input. Parsing and evaluation recurse
/// once per operator, so this bounds stack use.
pub const MAX_OPERATORS: usize = 256;

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub value: Value,
    pub formatted: String,
    /// Unit symbol or currency code; empty for plain numbers.
    pub unit_label: String,
    #[serde(skip)]
    pub agent: AgentKind,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    preprocessor: Preprocessor,
    formatter: ValueFormatter,
    agents: Vec<AgentKind>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_formatter(FormatterConfig::default())
    }

    pub fn with_formatter(config: FormatterConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            formatter: ValueFormatter::new(config),
            agents: AgentKind::in_priority_order(),
        }
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Evaluates `input` with the active locale. On success the context
    /// gets any assignment and exactly one new history entry; on failure
    /// it is left as it was.
    #[instrument(level = "debug", skip(self, context))]
    pub fn evaluate(&self, input: &str, context: &mut Context) -> NumbyResult<Evaluation> {
        self.evaluate_in(input, context, locale::current())
    }

    pub fn evaluate_in(
        &self,
        input: &str,
        context: &mut Context,
        locale: &LocaleSetting,
    ) -> NumbyResult<Evaluation> {
        let (value, agent) = self.interpret(input, context, locale)?;
        let formatted = self.formatter.format(&value, locale);
        let unit_label = value.unit_label().to_string();
        let sequence = context.append_history(input.trim(), value.clone(), formatted.clone());
        debug!("#{} {} => {} via {}", sequence, input, formatted, agent);
        Ok(Evaluation {
            value,
            formatted,
            unit_label,
            agent,
        })
    }

    /// Evaluates on a scratch copy; `context` is never modified.
    pub fn preview(&self, input: &str, context: &Context) -> NumbyResult<Evaluation> {
        let mut scratch = context.clone();
        self.evaluate(input, &mut scratch)
    }

    /// Runs the agents without recording history.
    pub fn interpret(
        &self,
        input: &str,
        context: &mut Context,
        locale: &LocaleSetting,
    ) -> NumbyResult<(Value, AgentKind)> {
        validate_input(input)?;
        let normalized = self.preprocessor.process(input, locale);
        let statement = parse(&normalized, locale)?;
        let input = Input {
            raw: input,
            normalized: &normalized,
            statement: &statement,
            locale,
        };

        for agent in &self.agents {
            match agent.try_interpret(&input, context) {
                Interpretation::NotApplicable => continue,
                Interpretation::Resolved(value) => return Ok((value, *agent)),
                Interpretation::Failed(error) => {
                    debug!("{} agent failed on '{}': {}", agent, input.normalized, error);
                    return Err(error);
                }
            }
        }
        Err(NumbyError::parse(format!("cannot interpret '{}'", input.raw)))
    }
}

fn validate_input(input: &str) -> NumbyResult<()> {
    if input.len() > MAX_EXPR_LENGTH {
        return Err(NumbyError::InputTooLarge {
            len: input.len(),
            max: MAX_EXPR_LENGTH,
        });
    }
    if input.trim().is_empty() {
        return Err(NumbyError::InvalidInput("empty input".to_string()));
    }
    Ok(())
}

/// Parse failures are handed to the agents; only oversized nesting is
/// rejected outright.
fn parse(normalized: &str, locale: &LocaleSetting) -> NumbyResult<Result<Statement, String>> {
    let tokens = match tokenize_significant(normalized) {
        Ok(tokens) => tokens,
        Err(e) => return Ok(Err(e.to_string())),
    };
    check_nesting(&tokens)?;
    Ok(parse_statement(&tokens, locale).map_err(|e| e.to_string()))
}

fn check_nesting(tokens: &[Token]) -> NumbyResult<()> {
    let mut depth = 0usize;
    let mut operators = 0usize;
    for token in tokens {
        match token {
            Token::Delimiter(Delimiter::OpenParen) => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(NumbyError::InvalidInput(format!(
                        "parentheses nested deeper than {}",
                        MAX_NESTING_DEPTH
                    )));
                }
            }
            Token::Delimiter(Delimiter::CloseParen) => depth = depth.saturating_sub(1),
            Token::Operator(Operator::Assign) => {}
            Token::Operator(_) => {
                operators += 1;
                if operators > MAX_OPERATORS {
                    return Err(NumbyError::InvalidInput(format!(
                        "more than {} operators",
                        MAX_OPERATORS
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::locale::LOCALES;
    use crate::value::ValueKind;
    use pretty_assertions::assert_eq;

    fn english() -> &'static LocaleSetting {
        &LOCALES[0]
    }

    fn run(pipeline: &Pipeline, ctx: &mut Context, input: &str) -> NumbyResult<Evaluation> {
        pipeline.evaluate_in(input, ctx, english())
    }

    #[test]
    fn test_agent_selection() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let cases = [
            ("2 + 3 * 4", AgentKind::Math),
            ("prev + 1", AgentKind::History),
            ("x = 5", AgentKind::Variable),
            ("x * 2", AgentKind::Variable),
            ("10% of 50", AgentKind::Percentage),
            ("3 km to miles", AgentKind::Unit),
        ];
        for (input, agent) in cases {
            let evaluation = run(&pipeline, &mut ctx, input).unwrap();
            assert_eq!(evaluation.agent, agent, "{}", input);
        }
    }

    #[test]
    fn test_bound_name_wins_over_constant() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        ctx.set_variable("e", crate::value::Value::number(7.0)).unwrap();
        let evaluation = run(&pipeline, &mut ctx, "e").unwrap();
        assert_eq!(evaluation.agent, AgentKind::Variable);
        assert_eq!(evaluation.value.amount, 7.0);
    }

    #[test]
    fn test_history_grows_only_on_success() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        run(&pipeline, &mut ctx, "1 + 1").unwrap();
        assert!(run(&pipeline, &mut ctx, "5 / 0").is_err());
        assert!(run(&pipeline, &mut ctx, "1 +").is_err());
        run(&pipeline, &mut ctx, "y = 3").unwrap();
        assert_eq!(ctx.history_count(), 2);
        let inputs: Vec<&str> = ctx.history().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["1 + 1", "y = 3"]);
    }

    #[test]
    fn test_empty_history_fails_in_history_agent() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let error = run(&pipeline, &mut ctx, "prev").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownHistoryReference);
    }

    #[test]
    fn test_unparseable_input_yields_one_parse_error() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        for input in ["5 @ 3", "(1 + 2", "* 4"] {
            let error = run(&pipeline, &mut ctx, input).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::ParseError, "{}", input);
        }
    }

    #[test]
    fn test_input_limits() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let long = "1".repeat(MAX_EXPR_LENGTH + 1);
        assert_eq!(
            run(&pipeline, &mut ctx, &long).unwrap_err().kind(),
            ErrorKind::InputTooLarge
        );
        assert_eq!(
            run(&pipeline, &mut ctx, "   ").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_deep_nesting_is_rejected_without_overflow() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let parens = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let chain = vec!["1"; 40_000].join("+");
        let signs = format!("{}1", "-".repeat(50_000));
        for input in [&parens, &chain, &signs] {
            assert!(input.len() <= MAX_EXPR_LENGTH);
            let error = run(&pipeline, &mut ctx, input).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidInput);
        }
        assert_eq!(ctx.history_count(), 0);
    }

    #[test]
    fn test_nesting_at_the_limits_still_evaluates() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let parens = format!(
            "{}2{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert_eq!(run(&pipeline, &mut ctx, &parens).unwrap().value.amount, 2.0);

        let chain = vec!["1"; MAX_OPERATORS + 1].join("+");
        assert_eq!(
            run(&pipeline, &mut ctx, &chain).unwrap().value.amount,
            (MAX_OPERATORS + 1) as f64
        );
    }

    #[test]
    fn test_formatted_output() {
        let pipeline = Pipeline::new();
        let mut ctx = Context::new();
        let evaluation = run(&pipeline, &mut ctx, "1000 * 1000 km").unwrap();
        assert_eq!(evaluation.formatted, "1,000,000 km");
        assert_eq!(evaluation.unit_label, "km");
        assert_eq!(evaluation.value.kind, ValueKind::Unit("km".to_string()));

        let evaluation = run(&pipeline, &mut ctx, "$20 + 5").unwrap();
        assert_eq!(evaluation.formatted, "$25.00");
        assert_eq!(evaluation.unit_label, "USD");
    }

    #[test]
    fn test_preview_leaves_context_untouched() {
        let pipeline = Pipeline::new();
        let ctx = Context::new();
        let evaluation = pipeline.preview("z = 2 ^ 10", &ctx).unwrap();
        assert_eq!(evaluation.value.amount, 1024.0);
        assert!(!ctx.has_variable("z"));
        assert_eq!(ctx.history_count(), 0);
    }
}
