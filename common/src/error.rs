//! Error types for currency input handling.

use thiserror::Error;

/// Errors raised while turning raw input into currency codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The currency code was empty or only whitespace.
    #[error("Currency code cannot be blank")]
    Empty,

    /// A symbol list contained no usable codes.
    #[error("No valid symbols found in: {0:?}")]
    NoSymbols(String),
}

impl CurrencyError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrencyError::Empty => "BLANK_CURRENCY",
            CurrencyError::NoSymbols(_) => "NO_SYMBOLS",
        }
    }
}
