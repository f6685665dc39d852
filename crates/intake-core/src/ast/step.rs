//! Steps, options and the enumerations that classify them

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{OptionId, StepId};

/// Which template slot a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Personalization,
    Account,
    Doctor,
}

impl SectionType {
    /// Fixed composition order of the three sections
    pub const ORDERED: [SectionType; 3] = [
        SectionType::Personalization,
        SectionType::Account,
        SectionType::Doctor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Personalization => "personalization",
            SectionType::Account => "account",
            SectionType::Doctor => "doctor",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of screen a step renders.
///
/// Independent of [`SectionType`]. The historical `doctor` category was folded
/// into `normal` and is still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    /// A question the patient answers
    #[default]
    #[serde(alias = "doctor")]
    Normal,
    /// An informational screen; never requires an answer
    Informational,
}

/// Risk signal attached to an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Review,
    Reject,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "safe"),
            RiskLevel::Review => write!(f, "review"),
            RiskLevel::Reject => write!(f, "reject"),
        }
    }
}

/// A selectable answer choice of a closed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOption {
    pub id: OptionId,
    pub label: String,
    /// `None` means the option carries no risk signal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl StepOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            risk_level: None,
        }
    }

    pub fn with_risk(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }
}

/// One question or informational screen, as authored.
///
/// `conditional_logic` is the raw payload stored by the authoring tool. It is
/// parsed into a [`Condition`](crate::Condition) exactly once, when a step graph
/// is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,

    /// Ordinal position within its template (renumbered on composition)
    #[serde(default)]
    pub position: u32,

    pub section: SectionType,

    #[serde(default)]
    pub category: StepCategory,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_required")]
    pub required: bool,

    /// Reaching this step ends the flow
    #[serde(default, alias = "is_dead_end")]
    pub dead_end: bool,

    /// Absent means "always shown"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<serde_json::Value>,

    /// Closed answer set; empty for free-text and informational steps
    #[serde(default)]
    pub options: Vec<StepOption>,
}

fn default_required() -> bool {
    true
}

impl Step {
    /// Create a required, always-shown question step
    pub fn new(id: impl Into<String>, section: SectionType) -> Self {
        Self {
            id: id.into(),
            position: 0,
            section,
            category: StepCategory::Normal,
            title: None,
            required: true,
            dead_end: false,
            conditional_logic: None,
            options: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn informational(mut self) -> Self {
        self.category = StepCategory::Informational;
        self
    }

    pub fn dead_end(mut self) -> Self {
        self.dead_end = true;
        self
    }

    pub fn with_logic(mut self, logic: serde_json::Value) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    pub fn with_option(mut self, option: StepOption) -> Self {
        self.options.push(option);
        self
    }

    /// Whether the step offers a closed answer set
    pub fn is_closed(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn is_informational(&self) -> bool {
        self.category == StepCategory::Informational
    }

    /// Whether navigation forward requires an answer on this step
    pub fn needs_answer(&self) -> bool {
        self.required && !self.is_informational()
    }

    pub fn option(&self, option_id: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}
