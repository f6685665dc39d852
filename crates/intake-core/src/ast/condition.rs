//! Conditional-logic expression tree
//!
//! A closed tagged tree: leaf predicates over a single step's answer, combined
//! with AND / OR / NOT. Trees are produced by the parser from the free-form
//! payload stored on a step and evaluated many times afterwards.

use super::operator::ComparisonOperator;
use crate::types::Value;
use crate::StepId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditional-logic expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Every child must hold (AND)
    All(Vec<Condition>),
    /// At least one child must hold (OR)
    Any(Vec<Condition>),
    /// Negation
    Not(Box<Condition>),
    /// Leaf predicate
    Predicate(Predicate),
}

/// A test against one step's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub step_id: StepId,
    pub kind: PredicateKind,
}

/// Predicate kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    /// The answer is exactly the value (a list means the exact selection set)
    Equals(Value),
    /// The answer includes the value (every element, for a list)
    Contains(Value),
    /// The step was answered and the answer includes none of the values
    Excludes(Value),
    /// Numeric comparison of the answer against a constant
    Compare { op: ComparisonOperator, value: f64 },
}

impl Condition {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All(conditions)
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any(conditions)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    pub fn equals(step_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Predicate(Predicate::new(step_id, PredicateKind::Equals(value.into())))
    }

    pub fn contains(step_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Predicate(Predicate::new(step_id, PredicateKind::Contains(value.into())))
    }

    pub fn excludes(step_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Predicate(Predicate::new(step_id, PredicateKind::Excludes(value.into())))
    }

    pub fn compare(step_id: impl Into<String>, op: ComparisonOperator, value: f64) -> Self {
        Condition::Predicate(Predicate::new(step_id, PredicateKind::Compare { op, value }))
    }

    /// All leaf predicates, depth-first
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut result = Vec::new();
        self.collect_predicates(&mut result);
        result
    }

    fn collect_predicates<'a>(&'a self, result: &mut Vec<&'a Predicate>) {
        match self {
            Condition::All(items) | Condition::Any(items) => {
                for item in items {
                    item.collect_predicates(result);
                }
            }
            Condition::Not(inner) => inner.collect_predicates(result),
            Condition::Predicate(p) => result.push(p),
        }
    }

    /// Distinct step identifiers referenced anywhere in the tree, in first-seen order
    pub fn referenced_steps(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in self.predicates() {
            if !seen.contains(&p.step_id.as_str()) {
                seen.push(&p.step_id);
            }
        }
        seen
    }
}

impl Predicate {
    pub fn new(step_id: impl Into<String>, kind: PredicateKind) -> Self {
        Self {
            step_id: step_id.into(),
            kind,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PredicateKind::Equals(v) => write!(f, "{} == {}", self.step_id, v),
            PredicateKind::Contains(v) => write!(f, "{} contains {}", self.step_id, v),
            PredicateKind::Excludes(v) => write!(f, "{} excludes {}", self.step_id, v),
            PredicateKind::Compare { op, value } => {
                write!(f, "{} {} {}", self.step_id, op, Value::Number(*value))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Condition], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, ")")
        }

        match self {
            Condition::All(items) => join(f, items, "AND"),
            Condition::Any(items) => join(f, items, "OR"),
            Condition::Not(inner) => write!(f, "NOT {}", inner),
            Condition::Predicate(p) => write!(f, "{}", p),
        }
    }
}
