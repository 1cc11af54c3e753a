//! # Analyzer
//!
//! Turns the significant tokens of one input line into a [`Statement`]
//! using a small set of parser combinators.
//!
//! ```text
//! input → Preprocessor → Tokenizer → Analyzer → agents → Formatter
//! ```
//!
//! * [`core`]: the [`Parser`] trait and [`ParseError`]
//! * [`combinators`] / [`prelude`]: reusable building blocks
//! * [`parsers`]: the calculator grammar
//!
//! ```
//! use numby::analyzer::parse_statement;
//! use numby::locale::LOCALES;
//! use numby::tokenizer::token::tokenize_significant;
//!
//! let tokens = tokenize_significant("x = 5 km to m").unwrap();
//! let statement = parse_statement(&tokens, &LOCALES[0]).unwrap();
//! assert_eq!(statement.assignment.as_deref(), Some("x"));
//! assert_eq!(statement.conversion.as_deref(), Some("m"));
//! ```
//!
//! [`Statement`]: crate::ast::Statement

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;
pub use parsers::{parse_expression, parse_statement};
