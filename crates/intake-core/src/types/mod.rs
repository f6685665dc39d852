//! Value types used by conditional-logic predicates

pub mod value;

pub use value::Value;
