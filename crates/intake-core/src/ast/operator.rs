//! Numeric comparison operators for conditional logic

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
}

impl ComparisonOperator {
    /// Parse the operator symbol used in shorthand expressions
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" | "gt" => Some(ComparisonOperator::Gt),
            ">=" | "ge" | "gte" => Some(ComparisonOperator::Ge),
            "<" | "lt" => Some(ComparisonOperator::Lt),
            "<=" | "le" | "lte" => Some(ComparisonOperator::Le),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
        }
    }

    /// Apply the comparison. NaN never satisfies any operator.
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match left.partial_cmp(&right) {
            Some(ordering) => match self {
                ComparisonOperator::Gt => ordering == Ordering::Greater,
                ComparisonOperator::Ge => ordering != Ordering::Less,
                ComparisonOperator::Lt => ordering == Ordering::Less,
                ComparisonOperator::Le => ordering != Ordering::Greater,
            },
            None => false,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbol() {
        assert_eq!(ComparisonOperator::from_symbol(">="), Some(ComparisonOperator::Ge));
        assert_eq!(ComparisonOperator::from_symbol("lt"), Some(ComparisonOperator::Lt));
        assert_eq!(ComparisonOperator::from_symbol("=="), None);
    }

    #[test]
    fn test_compare() {
        assert!(ComparisonOperator::Gt.compare(30.0, 18.0));
        assert!(!ComparisonOperator::Gt.compare(18.0, 18.0));
        assert!(ComparisonOperator::Ge.compare(18.0, 18.0));
        assert!(ComparisonOperator::Le.compare(17.5, 18.0));
        assert!(!ComparisonOperator::Lt.compare(f64::NAN, 1.0));
    }
}
