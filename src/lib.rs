//! # Numby: natural-language calculator engine
//!
//! Numby evaluates free-form calculator input such as `5 km to miles`,
//! `$20 + 15%`, `rate = 0.19` or `prev * 2` against a session holding
//! variables, a bounded result history and a currency rate set.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Input → Preprocessor → Tokenizer → Analyzer → Agents → Evaluator → Formatter
//! ```
//!
//! ### Stage 1: Preprocessing
//!
//! The [`preprocessor`] rewrites word operators (`times`, `divided by`),
//! currency symbols (`$100` → `100 USD`) and locale number separators
//! into one canonical text form.
//!
//! ### Stage 2: Tokenization
//!
//! The [`tokenizer`] turns normalized text into spanned tokens.
//!
//! ### Stage 3: Parsing
//!
//! The [`analyzer`] builds a [`Statement`] from the tokens with parser
//! combinators: an optional assignment, an expression and an optional
//! conversion target.
//!
//! ### Stage 4: Interpretation
//!
//! The [`agents`] are offered the statement in priority order (history,
//! variable, percentage, unit, math); the first that claims it evaluates
//! it through [`eval`].
//!
//! ### Stage 5: Formatting
//!
//! The [`formatter`] renders the resulting [`Value`] for the active
//! [`locale`].
//!
//! ## Hosts
//!
//! [`api::Session`] wraps a context behind a lock for embedding, [`ffi`]
//! exposes the same operations over the C ABI, and the `numby` binary is
//! a small command-line front end. Configuration lives in [`config`];
//! currency rates come from [`currency_fetcher`] and their freshness is
//! tracked in [`rates`].
//!
//! ```rust
//! use numby::Session;
//!
//! let session = Session::new();
//! session.evaluate("x = 4").unwrap();
//! assert_eq!(session.evaluate("x ^ 2 + 1").unwrap().formatted, "17");
//! ```

pub mod agents;
pub mod analyzer;
pub mod api;
pub mod ast;
pub mod config;
pub mod currency_fetcher;
pub mod error;
pub mod eval;
pub mod ffi;
pub mod formatter;
pub mod locale;
pub mod preprocessor;
pub mod rates;
pub mod tokenizer;
pub mod units;
pub mod value;

// Re-exports
pub use agents::{AgentKind, Evaluation, Pipeline, MAX_EXPR_LENGTH};
pub use api::Session;
pub use ast::{Expression, Statement};
pub use error::*;
pub use eval::{Context, HistoryEntry};
pub use locale::LocaleSetting;
pub use value::{Value, ValueKind};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
