//! # Tokenizer
//!
//! Lexical analysis of calculator input. Normalized text (see
//! [`crate::preprocessor`]) is turned into a stream of [`TokenSpan`]s that
//! the [`crate::analyzer`] consumes.
//!
//! ## Component Structure
//!
//! * [`token`]: token types and the [`Tokenizer`](token::Tokenizer) itself
//! * [`keyword`]: history words and conversion words
//! * [`symbol`]: operators and delimiters
//! * [`literal`]: decimal, scientific, hex, binary and octal numbers
//! * [`whitespace`]: runs of spaces and tabs
//!
//! Whitespace is kept as tokens so error positions stay exact; the analyzer
//! drops it before parsing.
//!
//! ```rust
//! use numby::tokenizer::token::{Token, Tokenizer};
//!
//! let tokens = Tokenizer::new().tokenize("5km + 2").unwrap();
//! assert_eq!(tokens[1].token, Token::Identifier("km".to_string()));
//! ```

pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;

pub use token::{Token, TokenSpan, Tokenizer, TokenizerError};
