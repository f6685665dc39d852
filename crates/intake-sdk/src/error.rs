//! SDK error types

use intake_core::ast::SectionType;
use intake_runtime::{ErrorKind, GraphWarning};
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Engine configuration could not be read
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Repository section of the configuration is incomplete
    #[error("Invalid repository configuration: {0}")]
    RepositoryConfig(#[from] intake_repository::ConfigError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] intake_runtime::RuntimeError),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(#[from] intake_repository::RepositoryError),

    /// An assignment names a template that is not stored
    #[error("Template '{template_id}' assigned to the {section} slot does not exist")]
    MissingTemplate {
        template_id: String,
        section: SectionType,
    },

    /// An assignment names a template owned by another tenant
    #[error("Template '{template_id}' belongs to tenant '{owner}' and cannot be used by tenant '{tenant_id}'")]
    CrossTenantTemplate {
        template_id: String,
        owner: String,
        tenant_id: String,
    },

    /// An assignment puts a template into the wrong section slot
    #[error("Template '{template_id}' is a {actual} template but is assigned to the {expected} slot")]
    SectionMismatch {
        template_id: String,
        expected: SectionType,
        actual: SectionType,
    },

    /// Authoring warnings while warnings are configured to be fatal
    #[error("Questionnaire has authoring warnings: {}", join_warnings(.0))]
    StrictWarnings(Vec<GraphWarning>),

    /// Submission requested before the flow reached a terminal state
    #[error("Session is still in progress at step '{0}'")]
    SessionInProgress(String),

    /// Tracing subscriber could not be installed
    #[error("Failed to initialize tracing: {0}")]
    Telemetry(String),
}

fn join_warnings(warnings: &[GraphWarning]) -> String {
    warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SdkError {
    /// Classify the error for the caller.
    ///
    /// Configuration errors mean the flow cannot be built. Validation errors
    /// leave the session unchanged. NotFound is an unknown identifier.
    pub fn kind(&self) -> ErrorKind {
        use intake_repository::RepositoryError;

        match self {
            SdkError::RuntimeError(e) => e.kind(),
            SdkError::RepositoryError(
                RepositoryError::TemplateNotFound { .. }
                | RepositoryError::AssignmentNotFound { .. }
                | RepositoryError::InvalidIdentifier(_),
            ) => ErrorKind::NotFound,
            SdkError::SessionInProgress(_) => ErrorKind::Validation,
            SdkError::ConfigError(_)
            | SdkError::ConfigLoad(_)
            | SdkError::RepositoryConfig(_)
            | SdkError::RepositoryError(_)
            | SdkError::MissingTemplate { .. }
            | SdkError::CrossTenantTemplate { .. }
            | SdkError::SectionMismatch { .. }
            | SdkError::StrictWarnings(_)
            | SdkError::Telemetry(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
