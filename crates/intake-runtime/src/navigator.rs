//! Flow navigator: the per-session state machine over a step graph
//!
//! State is (current position, accumulated answers, terminal flag). Answers are
//! never deleted: editing an earlier answer only changes which later steps are
//! reachable, and answers on branches that fell out of reach stay stored but
//! are excluded from [`FlowSession::visible_answers`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use intake_core::ast::Step;
use intake_core::{Answer, AnswerSet, AnswerValue, StepId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError, ValidationError};
use crate::graph::{StepGraph, WalkEnd};

/// Session state. Both terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    InProgress,
    /// A dead-end step was reached
    Disqualified,
    /// Every reachable step was handled
    Completed,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlowState::InProgress)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::InProgress => write!(f, "in progress"),
            FlowState::Disqualified => write!(f, "disqualified"),
            FlowState::Completed => write!(f, "completed"),
        }
    }
}

/// Where a transition left the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "step_id", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Moved to the given step
    Advanced(StepId),
    /// Moved to the given dead-end step; the flow is over
    Disqualified(StepId),
    /// No reachable step remains
    Completed,
}

/// Result of a forward transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// The answer written by this transition, for the caller to persist
    pub recorded: Option<Answer>,
    pub outcome: StepOutcome,
}

/// One patient's walk through a questionnaire
#[derive(Debug, Clone)]
pub struct FlowSession {
    graph: Arc<StepGraph>,
    answers: AnswerSet,
    position: Option<usize>,
    history: Vec<usize>,
    state: FlowState,
}

impl FlowSession {
    /// Start a new session at the first step that is shown
    pub fn start(graph: Arc<StepGraph>) -> Self {
        let mut session = Self {
            graph,
            answers: AnswerSet::new(),
            position: None,
            history: Vec::new(),
            state: FlowState::InProgress,
        };
        session.advance_from(0);
        session
    }

    /// Rebuild a session from persisted answers.
    ///
    /// The session resumes at the earliest reachable step still waiting for an
    /// answer (an optional step left unanswered counts), or in the terminal
    /// state the answers lead to.
    pub fn resume(graph: Arc<StepGraph>, answers: AnswerSet) -> Self {
        let walk = graph.walk(&answers);
        let stop = match walk.end {
            WalkEnd::DeadEnd(i) => Some((i, FlowState::Disqualified)),
            WalkEnd::AwaitingAnswer(i) => Some((
                walk.first_unanswered.unwrap_or(i),
                FlowState::InProgress,
            )),
            WalkEnd::Exhausted => walk.first_unanswered.map(|i| (i, FlowState::InProgress)),
        };

        let (position, history, state) = match stop {
            Some((i, state)) => {
                let cut = walk.path.iter().position(|&p| p == i).unwrap_or(walk.path.len());
                (Some(i), walk.path[..cut].to_vec(), state)
            }
            None => (None, walk.path, FlowState::Completed),
        };

        tracing::debug!(
            answers = answers.len(),
            state = %state,
            position = ?position,
            "flow session resumed"
        );

        Self {
            graph,
            answers,
            position,
            history,
            state,
        }
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The step to render. On disqualification this is the dead-end step;
    /// after completion there is none.
    pub fn current_step(&self) -> Option<&Step> {
        self.position.and_then(|i| self.graph.step_at(i))
    }

    /// Every answer recorded in this session, including unreachable ones
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn into_answers(self) -> AnswerSet {
        self.answers
    }

    /// Answers of steps reachable under the current answers
    pub fn visible_answers(&self) -> AnswerSet {
        self.graph.reachable_answers(&self.answers)
    }

    /// Identifiers of previously visited steps, oldest first
    pub fn visited(&self) -> Vec<&str> {
        self.history
            .iter()
            .filter_map(|&i| self.graph.step_at(i))
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Record an answer for the current step and move forward
    pub fn submit_answer(&mut self, value: AnswerValue) -> Result<Transition> {
        let step = self.current_in_progress()?;
        Self::validate_answer(step, &value)?;

        let step_id = step.id.clone();
        if self.answers.record(step_id.clone(), value.clone()).is_some() {
            tracing::debug!(step_id = %step_id, "answer overwritten");
        }

        let outcome = self.advance();
        Ok(Transition {
            recorded: Some(Answer::new(step_id, value)),
            outcome,
        })
    }

    /// Move forward without recording a new answer.
    ///
    /// A required step without an answer is a validation error and the session
    /// is left unchanged.
    pub fn next(&mut self) -> Result<Transition> {
        let step = self.current_in_progress()?;
        if step.needs_answer() && !self.answers.contains(&step.id) {
            return Err(ValidationError::RequiredStepUnanswered {
                step_id: step.id.clone(),
            }
            .into());
        }

        Ok(Transition {
            recorded: None,
            outcome: self.advance(),
        })
    }

    /// Explicitly skip an optional step
    pub fn skip(&mut self) -> Result<Transition> {
        let step = self.current_in_progress()?;
        if step.needs_answer() {
            return Err(ValidationError::CannotSkipRequired {
                step_id: step.id.clone(),
            }
            .into());
        }
        tracing::debug!(step_id = %step.id, "step skipped");

        Ok(Transition {
            recorded: None,
            outcome: self.advance(),
        })
    }

    /// Return to the most recently visited step. Recorded answers are kept.
    pub fn previous(&mut self) -> Result<&Step> {
        self.current_in_progress()?;
        let index = self.history.pop().ok_or(RuntimeError::NoPreviousStep)?;
        self.position = Some(index);

        let step = self
            .graph
            .step_at(index)
            .ok_or(RuntimeError::NoPreviousStep)?;
        tracing::debug!(step_id = %step.id, "moved back");
        Ok(step)
    }

    fn current_in_progress(&self) -> Result<&Step> {
        if self.state.is_terminal() {
            return Err(RuntimeError::FlowTerminated(self.state));
        }
        self.current_step()
            .ok_or(RuntimeError::FlowTerminated(FlowState::Completed))
    }

    fn validate_answer(step: &Step, value: &AnswerValue) -> std::result::Result<(), ValidationError> {
        let step_id = || step.id.clone();

        if step.is_informational() {
            return Err(ValidationError::InformationalStep { step_id: step_id() });
        }

        match value {
            AnswerValue::Text(_) if step.is_closed() => {
                Err(ValidationError::ExpectedChoice { step_id: step_id() })
            }
            AnswerValue::Text(_) => Ok(()),
            AnswerValue::Choice(_) | AnswerValue::Choices(_) if !step.is_closed() => {
                Err(ValidationError::ExpectedText { step_id: step_id() })
            }
            AnswerValue::Choices(ids) if ids.is_empty() => {
                Err(ValidationError::EmptySelection { step_id: step_id() })
            }
            choice => match choice
                .selected_options()
                .iter()
                .find(|id| step.option(id).is_none())
            {
                Some(unknown) => Err(ValidationError::UnknownOption {
                    step_id: step_id(),
                    option_id: unknown.clone(),
                }),
                None => Ok(()),
            },
        }
    }

    /// Leave the current step and move to the next candidate
    fn advance(&mut self) -> StepOutcome {
        let Some(current) = self.position else {
            self.state = FlowState::Completed;
            return StepOutcome::Completed;
        };

        if let Some(step) = self.graph.step_at(current) {
            if step.dead_end {
                self.state = FlowState::Disqualified;
                return StepOutcome::Disqualified(step.id.clone());
            }
        }

        self.history.push(current);
        self.advance_from(current + 1)
    }

    fn advance_from(&mut self, from: usize) -> StepOutcome {
        let context = self.path_answers();
        match self.graph.next_candidate(from, &context) {
            Some(index) => self.enter(index),
            None => {
                self.position = None;
                self.state = FlowState::Completed;
                tracing::info!(visited = self.history.len(), "flow completed");
                StepOutcome::Completed
            }
        }
    }

    fn enter(&mut self, index: usize) -> StepOutcome {
        self.position = Some(index);
        let Some(step) = self.graph.step_at(index) else {
            self.state = FlowState::Completed;
            return StepOutcome::Completed;
        };
        let step_id = step.id.clone();

        if step.dead_end {
            self.state = FlowState::Disqualified;
            tracing::info!(step_id = %step_id, "flow disqualified at dead-end step");
            StepOutcome::Disqualified(step_id)
        } else {
            tracing::debug!(step_id = %step_id, "advanced");
            StepOutcome::Advanced(step_id)
        }
    }

    /// Answers of the steps on the path so far (history plus current)
    fn path_answers(&self) -> AnswerSet {
        let on_path: HashSet<&str> = self
            .history
            .iter()
            .chain(self.position.iter())
            .filter_map(|&i| self.graph.step_at(i))
            .map(|s| s.id.as_str())
            .collect();
        self.answers.filtered(|id| on_path.contains(id))
    }
}
