//! Patient answers

use serde::{Deserialize, Serialize};

use crate::{OptionId, StepId};

/// The value a patient gave for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// A single selected option
    Choice(OptionId),
    /// Several selected options (multi-select)
    Choices(Vec<OptionId>),
    /// Free text (also used for numeric entries)
    Text(String),
}

impl AnswerValue {
    pub fn choice(option_id: impl Into<String>) -> Self {
        AnswerValue::Choice(option_id.into())
    }

    pub fn choices<I, S>(option_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Choices(option_ids.into_iter().map(Into::into).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        AnswerValue::Text(text.into())
    }

    /// Option identifiers selected by this answer (empty for free text)
    pub fn selected_options(&self) -> &[OptionId] {
        match self {
            AnswerValue::Choice(id) => std::slice::from_ref(id),
            AnswerValue::Choices(ids) => ids,
            AnswerValue::Text(_) => &[],
        }
    }
}

/// A (step, value) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub step_id: StepId,
    pub value: AnswerValue,
}

impl Answer {
    pub fn new(step_id: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            step_id: step_id.into(),
            value,
        }
    }
}

/// Answers in insertion order, at most one per step.
///
/// Recording an answer for a step that already has one replaces the value in
/// place; the step keeps its original insertion slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the answer for `step_id`, returning the previous value
    pub fn record(&mut self, step_id: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        let step_id = step_id.into();
        if let Some(existing) = self.answers.iter_mut().find(|a| a.step_id == step_id) {
            log::trace!("overwriting answer for step {}", step_id);
            return Some(std::mem::replace(&mut existing.value, value));
        }
        self.answers.push(Answer::new(step_id, value));
        None
    }

    pub fn get(&self, step_id: &str) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|a| a.step_id == step_id)
            .map(|a| &a.value)
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.get(step_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Copy of the set keeping only answers whose step satisfies `keep`
    pub fn filtered<F>(&self, mut keep: F) -> AnswerSet
    where
        F: FnMut(&str) -> bool,
    {
        AnswerSet {
            answers: self
                .answers
                .iter()
                .filter(|a| keep(&a.step_id))
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        let mut set = AnswerSet::new();
        for answer in iter {
            set.record(answer.step_id, answer.value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AnswerSet {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites_in_place() {
        let mut answers = AnswerSet::new();
        answers.record("q1", AnswerValue::choice("yes"));
        answers.record("q2", AnswerValue::text("42"));
        let previous = answers.record("q1", AnswerValue::choice("no"));

        assert_eq!(previous, Some(AnswerValue::choice("yes")));
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("q1"), Some(&AnswerValue::choice("no")));
        let order: Vec<_> = answers.iter().map(|a| a.step_id.as_str()).collect();
        assert_eq!(order, vec!["q1", "q2"]);
    }

    #[test]
    fn test_filtered_keeps_storage_untouched() {
        let answers: AnswerSet = vec![
            Answer::new("a", AnswerValue::choice("x")),
            Answer::new("b", AnswerValue::choice("y")),
        ]
        .into_iter()
        .collect();

        let only_a = answers.filtered(|id| id == "a");
        assert_eq!(only_a.len(), 1);
        assert!(only_a.contains("a"));
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn test_selected_options() {
        assert_eq!(AnswerValue::choice("x").selected_options(), ["x".to_string()]);
        assert_eq!(AnswerValue::choices(["a", "b"]).selected_options().len(), 2);
        assert!(AnswerValue::text("free").selected_options().is_empty());
    }

    #[test]
    fn test_answer_value_serde() {
        let json = serde_json::to_string(&AnswerValue::choices(["a", "b"])).unwrap();
        assert_eq!(json, r#"{"kind":"choices","value":["a","b"]}"#);
        let back: AnswerValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AnswerValue::choices(["a", "b"]));
    }
}
