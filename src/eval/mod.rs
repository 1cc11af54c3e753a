//! Evaluation of parsed statements.
//!
//! * [`context`]: session state (variables, bounded history, rate set,
//!   unit table)
//! * [`arithmetic`]: unit- and currency-aware operators over values
//! * [`expression`]: the tree-walking expression evaluator
//! * [`evaluator`]: statement entry point, including assignment
//!
//! Evaluation reads the context through a shared borrow; the only write
//! is the final variable binding of an assignment, done after the value
//! has been computed, so a failed statement never leaves partial state.

pub mod arithmetic;
pub mod context;
pub mod evaluator;
pub mod expression;

pub use context::{Context, HistoryEntry};
pub use evaluator::Evaluator;
