//! Reusable template sections and their assignment to treatments

use serde::{Deserialize, Serialize};
use std::fmt;

use super::step::{SectionType, Step};
use crate::{TemplateId, TenantId, TreatmentId};

/// Who can see a template.
///
/// A template is either platform-wide or owned by exactly one tenant; the two
/// states are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateOwnership {
    /// Authored once, available to every tenant
    Global,
    /// Visible only to the owning tenant
    Tenant(TenantId),
}

impl TemplateOwnership {
    pub fn is_global(&self) -> bool {
        matches!(self, TemplateOwnership::Global)
    }

    /// Owning tenant, if tenant-owned
    pub fn tenant(&self) -> Option<&str> {
        match self {
            TemplateOwnership::Global => None,
            TemplateOwnership::Tenant(id) => Some(id),
        }
    }

    /// Whether `tenant_id` may use a template with this ownership
    pub fn visible_to(&self, tenant_id: &str) -> bool {
        match self {
            TemplateOwnership::Global => true,
            TemplateOwnership::Tenant(owner) => owner == tenant_id,
        }
    }
}

/// A named, reusable group of steps for one section type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub section: SectionType,
    pub ownership: TemplateOwnership,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        section: SectionType,
        ownership: TemplateOwnership,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            section,
            ownership,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// Ordering variant applied to a composed questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// personalization → account → doctor, as composed
    #[default]
    LayoutA,
    /// account before personalization, doctor last
    LayoutB,
    /// required doctor steps first, everything else after in composed order
    LayoutC,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LayoutA => write!(f, "layout_a"),
            Layout::LayoutB => write!(f, "layout_b"),
            Layout::LayoutC => write!(f, "layout_c"),
        }
    }
}

/// Binds three templates and a layout to one treatment of one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAssignment {
    pub tenant_id: TenantId,
    pub treatment_id: TreatmentId,
    pub personalization_template_id: TemplateId,
    pub account_template_id: TemplateId,
    pub doctor_template_id: TemplateId,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
}

impl TemplateAssignment {
    /// Template id assigned to a section slot
    pub fn template_for(&self, section: SectionType) -> &str {
        match section {
            SectionType::Personalization => &self.personalization_template_id,
            SectionType::Account => &self.account_template_id,
            SectionType::Doctor => &self.doctor_template_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_visibility() {
        assert!(TemplateOwnership::Global.visible_to("acme"));
        let owned = TemplateOwnership::Tenant("acme".to_string());
        assert!(owned.visible_to("acme"));
        assert!(!owned.visible_to("globex"));
        assert_eq!(owned.tenant(), Some("acme"));
    }

    #[test]
    fn test_ownership_serde_shape() {
        let global: TemplateOwnership = serde_json::from_str(r#""global""#).unwrap();
        assert!(global.is_global());
        let owned: TemplateOwnership = serde_json::from_str(r#"{"tenant": "acme"}"#).unwrap();
        assert_eq!(owned, TemplateOwnership::Tenant("acme".to_string()));
    }

    #[test]
    fn test_assignment_slots_and_layout() {
        let assignment: TemplateAssignment = serde_json::from_str(
            r#"{
                "tenant_id": "acme",
                "treatment_id": "weight_loss",
                "personalization_template_id": "p",
                "account_template_id": "a",
                "doctor_template_id": "d",
                "layout": "layout_c"
            }"#,
        )
        .unwrap();
        assert_eq!(assignment.layout, Layout::LayoutC);
        assert_eq!(assignment.template_for(SectionType::Account), "a");
        assert_eq!(assignment.template_for(SectionType::Doctor), "d");
        assert!(assignment.theme_id.is_none());
    }
}
