//! # Agent pipeline
//!
//! Every input is offered to a fixed, closed set of agents in ascending
//! priority. Each agent either declines ([`Interpretation::NotApplicable`]),
//! answers, or fails definitively; the first answer or failure ends the
//! run. [`MathAgent`] accepts everything and so terminates the chain.
//!
//! | agent       | priority | accepts                                   |
//! |-------------|----------|-------------------------------------------|
//! | History     | 10       | `prev`, `ans`, `sum`, `total`, `avg`, ... |
//! | Variable    | 20       | assignments and bound names               |
//! | Percentage  | 30       | `X%`, `X% of Y`                           |
//! | Unit        | 40       | quantities and `to`/`in`/`as` conversions |
//! | Math        | 50       | any expression                            |
//!
//! The input is parsed once; agents decide applicability on the shared
//! [`Statement`] and evaluate it with the shared [`Evaluator`].

pub mod history;
pub mod math;
pub mod percentage;
pub mod pipeline;
pub mod unit;
pub mod variable;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::ast::Statement;
use crate::error::{NumbyError, NumbyResult};
use crate::eval::{Context, Evaluator};
use crate::locale::LocaleSetting;
use crate::value::Value;

pub use history::HistoryAgent;
pub use math::MathAgent;
pub use percentage::PercentageAgent;
pub use pipeline::{Evaluation, Pipeline, MAX_EXPR_LENGTH};
pub use unit::UnitAgent;
pub use variable::VariableAgent;

/// One input as seen by the agents.
#[derive(Debug)]
pub struct Input<'a> {
    /// Text as the caller sent it.
    pub raw: &'a str,
    /// Text after normalization, as tokenized.
    pub normalized: &'a str,
    /// Parse result, or the parse error message.
    pub statement: &'a Result<Statement, String>,
    pub locale: &'a LocaleSetting,
}

#[derive(Debug)]
pub enum Interpretation {
    NotApplicable,
    Resolved(Value),
    Failed(NumbyError),
}

impl From<NumbyResult<Value>> for Interpretation {
    fn from(result: NumbyResult<Value>) -> Self {
        match result {
            Ok(value) => Interpretation::Resolved(value),
            Err(error) => Interpretation::Failed(error),
        }
    }
}

pub trait Agent {
    /// Whether this agent claims the statement.
    fn applies(&self, statement: &Statement, context: &Context) -> bool;

    fn try_interpret(&self, input: &Input, context: &mut Context) -> Interpretation {
        let Ok(statement) = input.statement else {
            return Interpretation::NotApplicable;
        };
        if !self.applies(statement, context) {
            return Interpretation::NotApplicable;
        }
        Evaluator::new()
            .eval_statement(statement, context, input.locale)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AgentKind {
    History,
    Variable,
    Percentage,
    Unit,
    Math,
}

impl AgentKind {
    pub const fn priority(self) -> u32 {
        match self {
            AgentKind::History => 10,
            AgentKind::Variable => 20,
            AgentKind::Percentage => 30,
            AgentKind::Unit => 40,
            AgentKind::Math => 50,
        }
    }

    /// All agents, lowest priority value first.
    pub fn in_priority_order() -> Vec<AgentKind> {
        let mut kinds: Vec<AgentKind> = AgentKind::iter().collect();
        kinds.sort_by_key(|kind| kind.priority());
        kinds
    }

    pub fn try_interpret(self, input: &Input, context: &mut Context) -> Interpretation {
        match self {
            AgentKind::History => HistoryAgent.try_interpret(input, context),
            AgentKind::Variable => VariableAgent.try_interpret(input, context),
            AgentKind::Percentage => PercentageAgent.try_interpret(input, context),
            AgentKind::Unit => UnitAgent.try_interpret(input, context),
            AgentKind::Math => MathAgent.try_interpret(input, context),
        }
    }
}
