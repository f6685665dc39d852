//! Authored data model for questionnaires
//!
//! This module contains:
//! - Steps and their selectable options
//! - Patient answers
//! - The conditional-logic expression tree
//! - Templates and treatment template assignments

pub mod answer;
pub mod condition;
pub mod operator;
pub mod step;
pub mod template;

pub use answer::{Answer, AnswerSet, AnswerValue};
pub use condition::{Condition, Predicate, PredicateKind};
pub use operator::ComparisonOperator;
pub use step::{RiskLevel, SectionType, Step, StepCategory, StepOption};
pub use template::{Layout, Template, TemplateAssignment, TemplateOwnership};
