//! Conditional-logic evaluation against collected answers
//!
//! Evaluation is pure: the same condition and answers always give the same
//! result. A predicate over a step that has not been answered yet is `false`;
//! it never raises. `NOT` of such a predicate is therefore `true`.

use intake_core::ast::{Condition, Predicate, PredicateKind};
use intake_core::{AnswerSet, AnswerValue, Value};

pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Evaluate a condition against the answers collected so far
    pub fn evaluate(condition: &Condition, answers: &AnswerSet) -> bool {
        match condition {
            Condition::All(items) => items.iter().all(|c| Self::evaluate(c, answers)),
            Condition::Any(items) => items.iter().any(|c| Self::evaluate(c, answers)),
            Condition::Not(inner) => !Self::evaluate(inner, answers),
            Condition::Predicate(predicate) => Self::evaluate_predicate(predicate, answers),
        }
    }

    /// Evaluate a single leaf predicate
    pub fn evaluate_predicate(predicate: &Predicate, answers: &AnswerSet) -> bool {
        let Some(answer) = answers.get(&predicate.step_id) else {
            return false;
        };

        match &predicate.kind {
            PredicateKind::Equals(expected) => Self::equals(answer, expected),
            PredicateKind::Contains(expected) => {
                let wanted = expected.texts();
                !wanted.is_empty() && wanted.iter().all(|w| Self::includes(answer, w))
            }
            PredicateKind::Excludes(expected) => {
                let unwanted = expected.texts();
                !unwanted.is_empty() && !unwanted.iter().any(|w| Self::includes(answer, w))
            }
            PredicateKind::Compare { op, value } => {
                Self::numeric(answer).is_some_and(|n| op.compare(n, *value))
            }
        }
    }

    fn equals(answer: &AnswerValue, expected: &Value) -> bool {
        match answer {
            AnswerValue::Choice(id) => {
                let texts = expected.texts();
                texts.len() == 1 && &texts[0] == id
            }
            AnswerValue::Choices(ids) => {
                let mut selected: Vec<&str> = ids.iter().map(String::as_str).collect();
                selected.sort_unstable();
                selected.dedup();
                let texts = expected.texts();
                let mut wanted: Vec<&str> = texts.iter().map(String::as_str).collect();
                wanted.sort_unstable();
                wanted.dedup();
                selected == wanted
            }
            AnswerValue::Text(text) => match expected {
                Value::Number(n) => text.trim().parse::<f64>().is_ok_and(|v| v == *n),
                Value::Bool(b) => text.trim().eq_ignore_ascii_case(&b.to_string()),
                Value::String(s) => text.trim() == s.trim(),
                Value::Null | Value::Array(_) => false,
            },
        }
    }

    /// Whether the answer includes `needle`: a selected option id, or a
    /// case-insensitive substring of free text
    fn includes(answer: &AnswerValue, needle: &str) -> bool {
        match answer {
            AnswerValue::Choice(id) => id == needle,
            AnswerValue::Choices(ids) => ids.iter().any(|id| id == needle),
            AnswerValue::Text(text) => text.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    fn numeric(answer: &AnswerValue) -> Option<f64> {
        match answer {
            AnswerValue::Text(text) | AnswerValue::Choice(text) => text.trim().parse::<f64>().ok(),
            AnswerValue::Choices(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::ast::ComparisonOperator;

    fn answers(pairs: &[(&str, AnswerValue)]) -> AnswerSet {
        let mut set = AnswerSet::new();
        for (step, value) in pairs {
            set.record(*step, value.clone());
        }
        set
    }

    #[test]
    fn test_equals_choice() {
        let set = answers(&[("smoker", AnswerValue::choice("yes"))]);
        assert!(ExpressionEvaluator::evaluate(&Condition::equals("smoker", "yes"), &set));
        assert!(!ExpressionEvaluator::evaluate(&Condition::equals("smoker", "no"), &set));
    }

    #[test]
    fn test_equals_multi_select_is_set_equality() {
        let set = answers(&[("symptoms", AnswerValue::choices(["b", "a"]))]);
        let exact = Condition::equals(
            "symptoms",
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        );
        assert!(ExpressionEvaluator::evaluate(&exact, &set));
        assert!(!ExpressionEvaluator::evaluate(&Condition::equals("symptoms", "a"), &set));
    }

    #[test]
    fn test_contains_and_excludes() {
        let set = answers(&[
            ("symptoms", AnswerValue::choices(["cough", "fever"])),
            ("notes", AnswerValue::text("History of Asthma")),
        ]);
        assert!(ExpressionEvaluator::evaluate(&Condition::contains("symptoms", "fever"), &set));
        assert!(ExpressionEvaluator::evaluate(&Condition::contains("notes", "asthma"), &set));
        assert!(ExpressionEvaluator::evaluate(&Condition::excludes("symptoms", "rash"), &set));
        assert!(!ExpressionEvaluator::evaluate(&Condition::excludes("symptoms", "cough"), &set));
    }

    #[test]
    fn test_numeric_compare() {
        let set = answers(&[("age", AnswerValue::text(" 17 "))]);
        let adult = Condition::compare("age", ComparisonOperator::Ge, 18.0);
        assert!(!ExpressionEvaluator::evaluate(&adult, &set));
        let minor = Condition::compare("age", ComparisonOperator::Lt, 18.0);
        assert!(ExpressionEvaluator::evaluate(&minor, &set));

        let not_a_number = answers(&[("age", AnswerValue::text("unknown"))]);
        assert!(!ExpressionEvaluator::evaluate(&minor, &not_a_number));
    }

    #[test]
    fn test_unanswered_step_is_false_and_negation_true() {
        let set = AnswerSet::new();
        let equals = Condition::equals("missing", "x");
        assert!(!ExpressionEvaluator::evaluate(&equals, &set));
        assert!(!ExpressionEvaluator::evaluate(&Condition::excludes("missing", "x"), &set));
        assert!(ExpressionEvaluator::evaluate(&Condition::not(equals), &set));
    }

    #[test]
    fn test_combinators() {
        let set = answers(&[
            ("sex", AnswerValue::choice("female")),
            ("age", AnswerValue::text("40")),
        ]);
        let cond = Condition::all(vec![
            Condition::equals("sex", "female"),
            Condition::any(vec![
                Condition::compare("age", ComparisonOperator::Lt, 18.0),
                Condition::compare("age", ComparisonOperator::Gt, 35.0),
            ]),
        ]);
        assert!(ExpressionEvaluator::evaluate(&cond, &set));
    }
}
