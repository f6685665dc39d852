//! Step graph: the validated structure of one questionnaire
//!
//! Built once from a flat list of steps. Construction parses every step's
//! conditional logic (a malformed payload refuses the whole graph) and collects
//! authoring warnings that do not prevent the flow from running.

use std::collections::{HashMap, HashSet};
use std::fmt;

use intake_core::ast::{Condition, PredicateKind, Step, StepOption};
use intake_core::AnswerSet;
use intake_parser::ConditionParser;
use serde::Serialize;

use crate::error::{Result, RuntimeError};
use crate::evaluator::ExpressionEvaluator;

/// Non-fatal authoring problems found while building a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum GraphWarning {
    /// A required step sits behind a dead-end that is always shown
    UnreachableRequiredStep { step_id: String, dead_end_id: String },
    /// A condition references a step that is not part of the graph
    UnknownStepReference { step_id: String, referenced: String },
    /// A condition references itself or a later step; it cannot be satisfied
    /// when the step is first considered
    ForwardReference { step_id: String, referenced: String },
    /// A condition depends on a dead-end step, whose answer is never collected
    DeadEndReference { step_id: String, referenced: String },
    /// A condition names an option the referenced step does not offer
    UnknownOptionReference {
        step_id: String,
        referenced: String,
        option_id: String,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::UnreachableRequiredStep { step_id, dead_end_id } => write!(
                f,
                "required step '{}' is only reachable past dead-end '{}'",
                step_id, dead_end_id
            ),
            GraphWarning::UnknownStepReference { step_id, referenced } => write!(
                f,
                "step '{}' references unknown step '{}'",
                step_id, referenced
            ),
            GraphWarning::ForwardReference { step_id, referenced } => write!(
                f,
                "step '{}' references step '{}' which is not before it",
                step_id, referenced
            ),
            GraphWarning::DeadEndReference { step_id, referenced } => write!(
                f,
                "step '{}' depends on dead-end step '{}'",
                step_id, referenced
            ),
            GraphWarning::UnknownOptionReference {
                step_id,
                referenced,
                option_id,
            } => write!(
                f,
                "step '{}' references option '{}' that step '{}' does not offer",
                step_id, option_id, referenced
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StepNode {
    step: Step,
    condition: Option<Condition>,
}

/// Ordered, validated questionnaire structure
#[derive(Debug, Clone, PartialEq)]
pub struct StepGraph {
    nodes: Vec<StepNode>,
    index: HashMap<String, usize>,
    warnings: Vec<GraphWarning>,
}

/// How a walk over the graph ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// Stopped at a step (by index) that needs an answer and has none
    AwaitingAnswer(usize),
    /// Reached a dead-end step (by index)
    DeadEnd(usize),
    /// Ran past the last step
    Exhausted,
}

/// Result of replaying the navigation rule over a set of answers
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    /// Indices of the steps visited, in order
    pub path: Vec<usize>,
    /// Answers of steps still reachable, including those past a step that is
    /// awaiting an answer; everything else is unreachable
    pub visible: AnswerSet,
    /// First visited optional step left without an answer
    pub first_unanswered: Option<usize>,
    pub end: WalkEnd,
}

impl StepGraph {
    /// Build a graph from steps, ordered by their position (stable for ties)
    pub fn new(mut steps: Vec<Step>) -> Result<Self> {
        steps.sort_by_key(|s| s.position);

        let parser = ConditionParser::new();
        let mut nodes = Vec::with_capacity(steps.len());
        let mut index = HashMap::with_capacity(steps.len());

        for (i, step) in steps.into_iter().enumerate() {
            if index.insert(step.id.clone(), i).is_some() {
                return Err(RuntimeError::DuplicateStep(step.id));
            }

            let mut option_ids = HashSet::new();
            for option in &step.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(RuntimeError::DuplicateOption {
                        step_id: step.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
            }

            let condition = parser
                .parse_optional(step.conditional_logic.as_ref())
                .map_err(|source| RuntimeError::InvalidCondition {
                    step_id: step.id.clone(),
                    source,
                })?;

            nodes.push(StepNode { step, condition });
        }

        let mut graph = Self {
            nodes,
            index,
            warnings: Vec::new(),
        };
        graph.warnings = graph.collect_warnings();

        for warning in &graph.warnings {
            tracing::warn!(%warning, "step graph warning");
        }
        tracing::debug!(
            steps = graph.nodes.len(),
            warnings = graph.warnings.len(),
            "step graph built"
        );

        Ok(graph)
    }

    fn collect_warnings(&self) -> Vec<GraphWarning> {
        let mut warnings = Vec::new();

        for (i, node) in self.nodes.iter().enumerate() {
            let Some(condition) = &node.condition else {
                continue;
            };
            let step_id = &node.step.id;

            for referenced in condition.referenced_steps() {
                match self.index.get(referenced) {
                    None => warnings.push(GraphWarning::UnknownStepReference {
                        step_id: step_id.clone(),
                        referenced: referenced.to_string(),
                    }),
                    Some(&j) if j >= i => warnings.push(GraphWarning::ForwardReference {
                        step_id: step_id.clone(),
                        referenced: referenced.to_string(),
                    }),
                    Some(&j) if self.nodes[j].step.dead_end => {
                        warnings.push(GraphWarning::DeadEndReference {
                            step_id: step_id.clone(),
                            referenced: referenced.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }

            for predicate in condition.predicates() {
                let Some(target) = self.step(&predicate.step_id) else {
                    continue;
                };
                if !target.is_closed() {
                    continue;
                }
                let values = match &predicate.kind {
                    PredicateKind::Equals(v)
                    | PredicateKind::Contains(v)
                    | PredicateKind::Excludes(v) => v.texts(),
                    PredicateKind::Compare { .. } => continue,
                };
                for option_id in values {
                    if target.option(&option_id).is_none() {
                        warnings.push(GraphWarning::UnknownOptionReference {
                            step_id: step_id.clone(),
                            referenced: target.id.clone(),
                            option_id,
                        });
                    }
                }
            }
        }

        // Past an unconditional dead-end nothing is reachable.
        if let Some(d) = self
            .nodes
            .iter()
            .position(|n| n.step.dead_end && n.condition.is_none())
        {
            let dead_end_id = &self.nodes[d].step.id;
            for node in &self.nodes[d + 1..] {
                if node.step.needs_answer() {
                    warnings.push(GraphWarning::UnreachableRequiredStep {
                        step_id: node.step.id.clone(),
                        dead_end_id: dead_end_id.clone(),
                    });
                }
            }
        }

        warnings
    }

    /// Steps in flow order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.nodes.iter().map(|n| &n.step)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a step by identifier
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.index.get(step_id).map(|&i| &self.nodes[i].step)
    }

    /// Step at a flow index
    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.nodes.get(index).map(|n| &n.step)
    }

    /// Flow index of a step
    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.index.get(step_id).copied()
    }

    /// Options of a step (empty for open and informational steps)
    pub fn options(&self, step_id: &str) -> Option<&[StepOption]> {
        self.step(step_id).map(|s| s.options.as_slice())
    }

    /// Parsed conditional logic of a step; `None` means always shown
    pub fn condition(&self, step_id: &str) -> Option<&Condition> {
        self.index
            .get(step_id)
            .and_then(|&i| self.nodes[i].condition.as_ref())
    }

    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Whether the step at `index` would be shown given `answers`
    pub fn is_candidate(&self, index: usize, answers: &AnswerSet) -> bool {
        match self.nodes.get(index) {
            Some(node) => node
                .condition
                .as_ref()
                .map_or(true, |c| ExpressionEvaluator::evaluate(c, answers)),
            None => false,
        }
    }

    /// First step at or after `from` that would be shown given `answers`
    pub fn next_candidate(&self, from: usize, answers: &AnswerSet) -> Option<usize> {
        (from..self.nodes.len()).find(|&i| self.is_candidate(i, answers))
    }

    /// Replay navigation from the first step using `answers`.
    ///
    /// Each candidate is evaluated only against answers of steps already on the
    /// path, so answers left behind on an abandoned branch never leak into the
    /// result. Optional and informational steps without an answer are passed.
    ///
    /// A required step without an answer ends the path but not the scan: later
    /// steps whose conditions still hold keep their answers visible, up to the
    /// next dead-end.
    pub fn walk(&self, answers: &AnswerSet) -> Walk {
        let mut path = Vec::new();
        let mut visible = AnswerSet::new();
        let mut first_unanswered = None;
        let mut end = None;
        let mut next = self.next_candidate(0, &visible);

        while let Some(i) = next {
            let step = &self.nodes[i].step;
            if end.is_none() {
                path.push(i);
            }

            if step.dead_end {
                end.get_or_insert(WalkEnd::DeadEnd(i));
                break;
            }

            match answers.get(&step.id) {
                Some(value) => {
                    visible.record(step.id.clone(), value.clone());
                }
                None if step.needs_answer() => {
                    end.get_or_insert(WalkEnd::AwaitingAnswer(i));
                }
                None => {
                    if end.is_none() && !step.is_informational() && first_unanswered.is_none() {
                        first_unanswered = Some(i);
                    }
                }
            }

            next = self.next_candidate(i + 1, &visible);
        }

        Walk {
            path,
            visible,
            first_unanswered,
            end: end.unwrap_or(WalkEnd::Exhausted),
        }
    }

    /// Answers of steps reachable under the current answers
    pub fn reachable_answers(&self, answers: &AnswerSet) -> AnswerSet {
        self.walk(answers).visible
    }
}
