//! Intake Parser - turns stored payloads into engine types
//!
//! Two kinds of input are handled here:
//! - conditional-logic payloads (free-form JSON/YAML stored on each step),
//!   parsed once into the closed [`Condition`](intake_core::Condition) tree
//! - template and treatment-assignment YAML documents

pub mod condition_parser;
pub mod error;
pub mod template_parser;

// Re-export main parser types
pub use condition_parser::ConditionParser;
pub use error::{ParseError, Result};
pub use template_parser::{AssignmentParser, TemplateParser};
