//! Intake Core - Core types and definitions for the questionnaire flow engine
//!
//! This crate provides the fundamental types used across the intake workspace:
//! - Predicate values used inside conditional logic
//! - Steps, options, answers and templates (the authored data model)
//! - The closed conditional-logic expression tree
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Answer, AnswerSet, AnswerValue, ComparisonOperator, Condition, Layout, Predicate,
    PredicateKind, RiskLevel, SectionType, Step, StepCategory, StepOption, Template,
    TemplateAssignment, TemplateOwnership,
};
pub use error::CoreError;
pub use types::Value;

/// Identifier of a step within a composed questionnaire
pub type StepId = String;

/// Identifier of an option within a step
pub type OptionId = String;

/// Identifier of a tenant (clinic / brand running its own portal)
pub type TenantId = String;

/// Identifier of a treatment offered by a tenant
pub type TreatmentId = String;

/// Identifier of a reusable template section
pub type TemplateId = String;
