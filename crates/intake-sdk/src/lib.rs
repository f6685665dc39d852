//! Intake flow engine SDK
//!
//! High-level API for composing questionnaires and running patient sessions.
//!
//! ```rust,no_run
//! use intake_core::AnswerValue;
//! use intake_sdk::{EngineConfig, FlowEngineBuilder};
//!
//! # async fn run() -> intake_sdk::Result<()> {
//! let config = EngineConfig::load()?;
//! intake_sdk::telemetry::init_tracing(&config)?;
//!
//! let engine = FlowEngineBuilder::new().with_config(config).build()?;
//! let mut session = engine.start_session("acme", "weight_loss").await?;
//! while !session.is_terminal() {
//!     // render session.current_step(), collect the patient's answer
//!     session.submit_answer(AnswerValue::text("..."))?;
//! }
//! let submission = engine.submit(&session)?;
//! println!("{}", submission.assessment.disposition);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod composer;
pub mod config;
pub mod error;
pub mod flow_engine;
pub mod telemetry;

// Re-export main types
pub use builder::FlowEngineBuilder;
pub use composer::{Questionnaire, TemplateComposer};
pub use config::{CacheSettings, EngineConfig, LogFormat};
pub use error::{Result, SdkError};
pub use flow_engine::{FlowEngine, Submission};

// Re-export commonly used types from dependencies
pub use intake_repository::{RepositoryConfig, TemplateRepository};
pub use intake_runtime::{
    Disposition, ErrorKind, FlowSession, FlowState, RiskAssessment, StepOutcome, Transition,
};
