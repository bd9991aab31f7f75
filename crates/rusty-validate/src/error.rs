//! Error types surfaced by the library
//!
//! Rule failures are never errors; they are reported through
//! [`ValidationResult`](crate::ValidationResult). These enums cover the few
//! cases a caller has to handle directly.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the regex guard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Input exceeded the length cap before any matching happened
    #[error("Input too long for pattern validation: {length} characters exceeds limit of {max}")]
    InputTooLong { length: usize, max: usize },

    /// Pattern rejected by the catastrophic-backtracking heuristics
    #[error("Potentially unsafe regex pattern detected: {0}")]
    UnsafePattern(String),

    /// The timer won the race against the match
    #[error("Regex execution timeout after {0:?} - potential ReDoS attack")]
    Timeout(Duration),

    /// Pattern failed to compile
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Errors raised by schema validation before any field is evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Data must be a valid object, found {0}")]
    DataNotObject(&'static str),
}

/// Errors raised while loading guard configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
