//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No template stored under this id
    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    /// No assignment for this tenant and treatment
    #[error("No template assignment for tenant '{tenant_id}' and treatment '{treatment_id}'")]
    AssignmentNotFound {
        tenant_id: String,
        treatment_id: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document does not parse
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: intake_parser::ParseError,
    },

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Identifier that cannot be mapped onto storage (empty, or contains path separators)
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl RepositoryError {
    /// Whether the error means "nothing stored under this key"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::TemplateNotFound { .. } | RepositoryError::AssignmentNotFound { .. }
        )
    }
}
