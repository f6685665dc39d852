//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Malformed conditional-logic payload
    #[error("Invalid condition '{condition}': {message}")]
    InvalidCondition { condition: String, message: String },

    /// Invalid operator
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Data model invariant violated by the document
    #[error(transparent)]
    Model(#[from] intake_core::CoreError),
}

impl ParseError {
    pub(crate) fn condition(condition: impl ToString, message: impl Into<String>) -> Self {
        ParseError::InvalidCondition {
            condition: condition.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
