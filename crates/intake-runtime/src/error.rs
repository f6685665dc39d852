//! Runtime error types

use crate::navigator::FlowState;
use thiserror::Error;

/// Coarse error classification shared by every layer of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The questionnaire is set up wrongly; no flow can be built
    Configuration,
    /// The patient's request cannot be applied; the session is unchanged
    Validation,
    /// An identifier does not resolve
    NotFound,
}

/// Answer-level validation failures. Recoverable: the patient is re-prompted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Step '{step_id}' is required and has no answer")]
    RequiredStepUnanswered { step_id: String },

    #[error("Step '{step_id}' is required and cannot be skipped")]
    CannotSkipRequired { step_id: String },

    #[error("Step '{step_id}' has no option '{option_id}'")]
    UnknownOption { step_id: String, option_id: String },

    #[error("Step '{step_id}' needs at least one selected option")]
    EmptySelection { step_id: String },

    #[error("Step '{step_id}' expects a selected option, not free text")]
    ExpectedChoice { step_id: String },

    #[error("Step '{step_id}' expects free text, not an option")]
    ExpectedText { step_id: String },

    #[error("Step '{step_id}' is informational and takes no answer")]
    InformationalStep { step_id: String },
}

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Two steps share an identifier
    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    /// Two options of one step share an identifier
    #[error("Duplicate option '{option_id}' in step '{step_id}'")]
    DuplicateOption { step_id: String, option_id: String },

    /// A conditional-logic payload does not parse
    #[error("Invalid conditional logic on step '{step_id}': {source}")]
    InvalidCondition {
        step_id: String,
        #[source]
        source: intake_parser::ParseError,
    },

    /// Answer validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The session reached an absorbing state
    #[error("Flow is {0}; no further transitions are possible")]
    FlowTerminated(FlowState),

    /// Backward navigation from the first visited step
    #[error("No previous step to return to")]
    NoPreviousStep,
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::DuplicateStep(_)
            | RuntimeError::DuplicateOption { .. }
            | RuntimeError::InvalidCondition { .. } => ErrorKind::Configuration,
            RuntimeError::Validation(_)
            | RuntimeError::FlowTerminated(_)
            | RuntimeError::NoPreviousStep => ErrorKind::Validation,
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RuntimeError::DuplicateStep("q".to_string()).kind(),
            ErrorKind::Configuration
        );
        let validation: RuntimeError = ValidationError::RequiredStepUnanswered {
            step_id: "q".to_string(),
        }
        .into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(
            RuntimeError::FlowTerminated(FlowState::Completed).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_validation_message() {
        let err = RuntimeError::from(ValidationError::UnknownOption {
            step_id: "smoker".to_string(),
            option_id: "maybe".to_string(),
        });
        assert_eq!(err.to_string(), "Step 'smoker' has no option 'maybe'");
    }
}
