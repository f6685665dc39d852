//! Intake Runtime - the questionnaire flow engine proper
//!
//! Everything in this crate is synchronous and free of I/O:
//! - [`ExpressionEvaluator`] decides whether a conditional-logic tree holds
//! - [`StepGraph`] is the validated, ordered set of steps of one questionnaire
//! - [`FlowSession`] walks a graph step by step as answers arrive
//! - [`RiskAggregator`] reduces the reachable answers to a review disposition
//!
//! A [`StepGraph`] is immutable once built and can be shared between sessions
//! behind an `Arc`; each [`FlowSession`] owns its answers exclusively.

pub mod error;
pub mod evaluator;
pub mod graph;
pub mod navigator;
pub mod risk;

// Re-export main types
pub use error::{ErrorKind, Result, RuntimeError, ValidationError};
pub use evaluator::ExpressionEvaluator;
pub use graph::{GraphWarning, StepGraph, Walk, WalkEnd};
pub use navigator::{FlowSession, FlowState, StepOutcome, Transition};
pub use risk::{Disposition, RiskAggregator, RiskAssessment, RiskFlag};
