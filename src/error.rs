use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::analyzer::core::ParseError;
use crate::config::ConfigError;
use crate::currency_fetcher::FetchError;
use crate::tokenizer::token::TokenizerError;
use crate::units::currency::RatesError;

/// Every failure the engine reports to its callers.
#[derive(Error, Debug)]
pub enum NumbyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input too large: {len} bytes exceeds the limit of {max} bytes")]
    InputTooLarge { len: usize, max: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Unknown history reference: '{0}' needs at least one previous result")]
    UnknownHistoryReference(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Incompatible units: {0}")]
    IncompatibleUnits(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("No exchange rate available for {0}")]
    MissingRate(String),

    #[error("Result is not a finite number")]
    NonFiniteResult,

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    #[error("Locale not found: {0}")]
    LocaleNotFound(String),
}

/// Discriminant of [`NumbyError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum ErrorKind {
    InvalidInput,
    InputTooLarge,
    ParseError,
    UnknownVariable,
    UnknownHistoryReference,
    DivisionByZero,
    IncompatibleUnits,
    InvalidName,
    ConfigError,
    NetworkError,
    LocaleNotFound,
    MissingRate,
    NonFiniteResult,
}

impl ErrorKind {
    /// Numeric code handed across the C boundary. Never zero.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::InvalidInput => 1,
            ErrorKind::InputTooLarge => 2,
            ErrorKind::ParseError => 3,
            ErrorKind::UnknownVariable => 4,
            ErrorKind::UnknownHistoryReference => 5,
            ErrorKind::DivisionByZero => 6,
            ErrorKind::IncompatibleUnits => 7,
            ErrorKind::InvalidName => 8,
            ErrorKind::ConfigError => 9,
            ErrorKind::NetworkError => 10,
            ErrorKind::LocaleNotFound => 11,
            ErrorKind::MissingRate => 12,
            ErrorKind::NonFiniteResult => 13,
        }
    }
}

impl NumbyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NumbyError::InvalidInput(_) => ErrorKind::InvalidInput,
            NumbyError::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            NumbyError::Parse(_) => ErrorKind::ParseError,
            NumbyError::UnknownVariable(_) => ErrorKind::UnknownVariable,
            NumbyError::UnknownHistoryReference(_) => ErrorKind::UnknownHistoryReference,
            NumbyError::DivisionByZero => ErrorKind::DivisionByZero,
            NumbyError::IncompatibleUnits(_) => ErrorKind::IncompatibleUnits,
            NumbyError::InvalidName(_) => ErrorKind::InvalidName,
            NumbyError::MissingRate(_) => ErrorKind::MissingRate,
            NumbyError::NonFiniteResult => ErrorKind::NonFiniteResult,
            NumbyError::Config(_) => ErrorKind::ConfigError,
            NumbyError::Network(_) => ErrorKind::NetworkError,
            NumbyError::LocaleNotFound(_) => ErrorKind::LocaleNotFound,
        }
    }

    pub fn code(&self) -> i32 {
        self.kind().code()
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        NumbyError::Parse(message.into())
    }

    pub fn incompatible<S: Into<String>>(message: S) -> Self {
        NumbyError::IncompatibleUnits(message.into())
    }
}

impl From<TokenizerError> for NumbyError {
    fn from(error: TokenizerError) -> Self {
        NumbyError::Parse(error.to_string())
    }
}

impl From<ParseError> for NumbyError {
    fn from(error: ParseError) -> Self {
        NumbyError::Parse(error.to_string())
    }
}

impl From<RatesError> for NumbyError {
    fn from(error: RatesError) -> Self {
        NumbyError::Config(ConfigError::Rates(error))
    }
}

pub type NumbyResult<T> = Result<T, NumbyError>;
