//! Error types for Intake Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A template declared both or neither of the global / tenant ownership markers
    #[error("Invalid template ownership for '{template_id}': {message}")]
    InvalidOwnership {
        template_id: String,
        message: String,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
