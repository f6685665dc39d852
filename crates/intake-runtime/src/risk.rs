//! Risk aggregation over the reachable answers of a session

use std::collections::BTreeSet;
use std::fmt;

use intake_core::ast::RiskLevel;
use intake_core::{AnswerSet, OptionId, StepId};
use serde::{Deserialize, Serialize};

use crate::graph::StepGraph;
use crate::navigator::FlowSession;

/// Review routing decision for a submission. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
    /// Auto-approve
    Safe,
    /// Route to manual clinical review
    Review,
    /// Auto-reject
    Reject,
}

impl From<RiskLevel> for Disposition {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Safe => Disposition::Safe,
            RiskLevel::Review => Disposition::Review,
            RiskLevel::Reject => Disposition::Reject,
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Safe => write!(f, "SAFE"),
            Disposition::Review => write!(f, "REVIEW"),
            Disposition::Reject => write!(f, "REJECT"),
        }
    }
}

/// A selected option that carries a risk level
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskFlag {
    pub step_id: StepId,
    pub option_id: OptionId,
    pub level: RiskLevel,
}

/// Disposition together with the flags that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub disposition: Disposition,
    /// Sorted by step then option; independent of answer order
    pub flags: Vec<RiskFlag>,
}

impl RiskAssessment {
    /// Flags at or above the given level
    pub fn flags_at_least(&self, level: RiskLevel) -> impl Iterator<Item = &RiskFlag> {
        self.flags.iter().filter(move |f| f.level >= level)
    }
}

/// Highest-severity-wins reduction of option risk levels
pub struct RiskAggregator;

impl RiskAggregator {
    /// Disposition of `answers` under `graph`
    pub fn assess(answers: &AnswerSet, graph: &StepGraph) -> Disposition {
        Self::assess_detailed(answers, graph).disposition
    }

    /// Disposition plus the individual risk flags.
    ///
    /// Only answers of steps reachable under `answers` count. Options without a
    /// risk level and free-text answers carry no signal. With no signal at all
    /// the disposition is [`Disposition::Safe`].
    pub fn assess_detailed(answers: &AnswerSet, graph: &StepGraph) -> RiskAssessment {
        let reachable = graph.reachable_answers(answers);

        let mut flags = BTreeSet::new();
        for answer in &reachable {
            let Some(step) = graph.step(&answer.step_id) else {
                continue;
            };
            for option_id in answer.value.selected_options() {
                if let Some(level) = step.option(option_id).and_then(|o| o.risk_level) {
                    flags.insert(RiskFlag {
                        step_id: step.id.clone(),
                        option_id: option_id.clone(),
                        level,
                    });
                }
            }
        }

        let disposition = flags
            .iter()
            .map(|f| Disposition::from(f.level))
            .max()
            .unwrap_or(Disposition::Safe);

        tracing::debug!(
            disposition = %disposition,
            flags = flags.len(),
            ignored = answers.len() - reachable.len(),
            "risk assessed"
        );

        RiskAssessment {
            disposition,
            flags: flags.into_iter().collect(),
        }
    }

    /// Assessment of a session's current answers
    pub fn assess_session(session: &FlowSession) -> RiskAssessment {
        Self::assess_detailed(session.answers(), session.graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::ast::{SectionType, Step, StepOption};
    use intake_core::AnswerValue;
    use serde_json::json;

    fn graph() -> StepGraph {
        StepGraph::new(vec![
            Step::new("smoker", SectionType::Doctor)
                .with_position(1)
                .with_option(StepOption::new("yes", "Yes").with_risk(RiskLevel::Review))
                .with_option(StepOption::new("no", "No").with_risk(RiskLevel::Safe)),
            Step::new("packs", SectionType::Doctor)
                .with_position(2)
                .with_logic(json!("smoker == yes"))
                .with_option(StepOption::new("many", "Many").with_risk(RiskLevel::Reject))
                .with_option(StepOption::new("few", "Few")),
            Step::new("notes", SectionType::Doctor).with_position(3).optional(),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_answers_is_safe() {
        assert_eq!(RiskAggregator::assess(&AnswerSet::new(), &graph()), Disposition::Safe);
    }

    #[test]
    fn test_highest_severity_wins() {
        let mut answers = AnswerSet::new();
        answers.record("smoker", AnswerValue::choice("yes"));
        assert_eq!(RiskAggregator::assess(&answers, &graph()), Disposition::Review);

        answers.record("packs", AnswerValue::choice("many"));
        let assessment = RiskAggregator::assess_detailed(&answers, &graph());
        assert_eq!(assessment.disposition, Disposition::Reject);
        assert_eq!(assessment.flags.len(), 2);
        assert_eq!(assessment.flags_at_least(RiskLevel::Reject).count(), 1);
    }

    #[test]
    fn test_unreachable_answers_are_ignored() {
        let mut answers = AnswerSet::new();
        answers.record("smoker", AnswerValue::choice("no"));
        answers.record("packs", AnswerValue::choice("many"));

        let assessment = RiskAggregator::assess_detailed(&answers, &graph());
        assert_eq!(assessment.disposition, Disposition::Safe);
        assert_eq!(
            assessment.flags,
            vec![RiskFlag {
                step_id: "smoker".to_string(),
                option_id: "no".to_string(),
                level: RiskLevel::Safe,
            }]
        );
    }

    #[test]
    fn test_disposition_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Disposition::Reject).unwrap(), "\"REJECT\"");
        assert!(Disposition::Reject > Disposition::Review);
    }
}
