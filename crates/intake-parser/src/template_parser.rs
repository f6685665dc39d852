//! Parsers for template and treatment-assignment documents
//!
//! Template document:
//!
//! ```yaml
//! template:
//!   id: weight_loss_screening
//!   name: Weight loss screening
//!   section: doctor
//!   ownership: global          # or `ownership: { tenant: acme }`
//!   steps:
//!     - id: bmi
//!       conditional_logic: height_known == "yes"
//!     - id: eating_disorder
//!       options:
//!         - { id: "yes", label: "Yes", risk_level: reject }
//!         - { id: "no", label: "No" }
//! ```
//!
//! Steps inherit the template's section when they omit it, and take their list
//! index (1-based) as position when they omit `position`. Documents exported
//! from the legacy schema may carry `is_global` / `tenant_id` instead of
//! `ownership`; exactly one of the two markers must be set.

use crate::error::{ParseError, Result};
use intake_core::ast::{SectionType, Step, Template, TemplateAssignment, TemplateOwnership};
use intake_core::CoreError;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

#[derive(Debug, Deserialize)]
struct RawTemplate {
    id: String,
    #[serde(default)]
    name: Option<String>,
    section: SectionType,
    /// `global` or `{ tenant: <id> }`
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    ownership: Option<TemplateOwnership>,
    #[serde(default, alias = "isGlobal")]
    is_global: Option<bool>,
    #[serde(default, alias = "tenantId")]
    tenant_id: Option<String>,
    #[serde(default)]
    steps: Vec<YamlValue>,
}

pub struct TemplateParser;

impl TemplateParser {
    /// Parse a template YAML document
    pub fn parse(content: &str) -> Result<Template> {
        let doc: YamlValue = serde_yaml::from_str(content)?;
        let body = doc.get("template").ok_or_else(|| ParseError::MissingField {
            field: "template".to_string(),
        })?;
        Self::parse_template(body)
    }

    /// Parse the body of a `template:` document
    pub fn parse_template(value: &YamlValue) -> Result<Template> {
        let raw: RawTemplate = serde_yaml::from_value(value.clone())?;
        let ownership =
            Self::resolve_ownership(&raw.id, raw.ownership, raw.is_global, raw.tenant_id)?;

        let mut steps = Vec::with_capacity(raw.steps.len());
        for (index, step_value) in raw.steps.into_iter().enumerate() {
            steps.push(Self::parse_step(step_value, raw.section, index)?);
        }

        log::debug!(
            "parsed template {} ({} section, {} steps)",
            raw.id,
            raw.section,
            steps.len()
        );

        Ok(Template {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            section: raw.section,
            ownership,
            steps,
        })
    }

    fn parse_step(mut value: YamlValue, section: SectionType, index: usize) -> Result<Step> {
        let mapping = value.as_mapping_mut().ok_or_else(|| ParseError::InvalidValue {
            field: format!("steps[{}]", index),
            message: "step must be a mapping".to_string(),
        })?;

        let section_key = YamlValue::String("section".to_string());
        if !mapping.contains_key(&section_key) {
            mapping.insert(section_key, YamlValue::String(section.as_str().to_string()));
        }

        let mut step: Step = serde_yaml::from_value(value)?;
        if step.section != section {
            return Err(ParseError::InvalidValue {
                field: format!("steps[{}].section", index),
                message: format!(
                    "step '{}' declares section {} inside a {} template",
                    step.id, step.section, section
                ),
            });
        }
        if step.position == 0 {
            step.position = index as u32 + 1;
        }
        Ok(step)
    }

    /// Collapse the ownership markers into a single [`TemplateOwnership`]
    pub fn resolve_ownership(
        template_id: &str,
        ownership: Option<TemplateOwnership>,
        is_global: Option<bool>,
        tenant_id: Option<String>,
    ) -> Result<TemplateOwnership> {
        let invalid = |message: &str| {
            ParseError::Model(CoreError::InvalidOwnership {
                template_id: template_id.to_string(),
                message: message.to_string(),
            })
        };

        let tenant_id = tenant_id.filter(|t| !t.trim().is_empty());
        match (ownership, is_global.unwrap_or(false), tenant_id) {
            (Some(ownership), false, None) => Ok(ownership),
            (Some(_), _, _) => Err(invalid(
                "'ownership' cannot be combined with 'is_global' or 'tenant_id'",
            )),
            (None, true, None) => Ok(TemplateOwnership::Global),
            (None, false, Some(tenant)) => Ok(TemplateOwnership::Tenant(tenant)),
            (None, true, Some(_)) => Err(invalid("template cannot be both global and tenant-owned")),
            (None, false, None) => Err(invalid("template must be global or owned by a tenant")),
        }
    }
}

pub struct AssignmentParser;

impl AssignmentParser {
    /// Parse a treatment template assignment YAML document
    ///
    /// ```yaml
    /// assignment:
    ///   tenant_id: acme
    ///   treatment_id: weight_loss
    ///   personalization_template_id: basics
    ///   account_template_id: account_default
    ///   doctor_template_id: weight_loss_screening
    ///   layout: layout_b
    ///   theme_id: spring
    /// ```
    pub fn parse(content: &str) -> Result<TemplateAssignment> {
        let doc: YamlValue = serde_yaml::from_str(content)?;
        let body = doc.get("assignment").ok_or_else(|| ParseError::MissingField {
            field: "assignment".to_string(),
        })?;
        let assignment: TemplateAssignment = serde_yaml::from_value(body.clone())?;

        for section in SectionType::ORDERED {
            if assignment.template_for(section).trim().is_empty() {
                return Err(ParseError::InvalidValue {
                    field: format!("{}_template_id", section),
                    message: "template id must not be empty".to_string(),
                });
            }
        }

        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::ast::{Layout, RiskLevel, StepCategory};

    const TEMPLATE_YAML: &str = r#"
template:
  id: screening
  name: Screening
  section: doctor
  ownership: global
  steps:
    - id: history
      category: doctor
      options:
        - { id: "yes", label: "Yes", risk_level: reject }
        - { id: "no", label: "No" }
    - id: stop
      dead_end: true
      conditional_logic: history == "yes"
"#;

    #[test]
    fn test_parse_template() {
        let template = TemplateParser::parse(TEMPLATE_YAML).unwrap();
        assert_eq!(template.id, "screening");
        assert!(template.ownership.is_global());
        assert_eq!(template.steps.len(), 2);

        let history = &template.steps[0];
        assert_eq!(history.section, SectionType::Doctor);
        assert_eq!(history.category, StepCategory::Normal);
        assert_eq!(history.position, 1);
        assert_eq!(history.options[0].risk_level, Some(RiskLevel::Reject));
        assert_eq!(history.options[1].risk_level, None);

        let stop = &template.steps[1];
        assert!(stop.dead_end);
        assert_eq!(stop.position, 2);
        assert!(stop.conditional_logic.is_some());
    }

    #[test]
    fn test_legacy_ownership_markers() {
        let yaml = r#"
template:
  id: acme_account
  section: account
  tenant_id: acme
  steps: []
"#;
        let template = TemplateParser::parse(yaml).unwrap();
        assert_eq!(template.ownership, TemplateOwnership::Tenant("acme".to_string()));
        assert_eq!(template.name, "acme_account");
    }

    #[test]
    fn test_both_global_and_tenant_is_rejected() {
        let yaml = r#"
template:
  id: broken
  section: account
  is_global: true
  tenant_id: acme
"#;
        let err = TemplateParser::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("both global and tenant-owned"));
    }

    #[test]
    fn test_neither_global_nor_tenant_is_rejected() {
        let yaml = r#"
template:
  id: orphan
  section: account
"#;
        assert!(TemplateParser::parse(yaml).is_err());
    }

    #[test]
    fn test_step_section_mismatch() {
        let yaml = r#"
template:
  id: mixed
  section: account
  ownership: global
  steps:
    - id: q
      section: doctor
"#;
        let err = TemplateParser::parse(yaml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_assignment() {
        let yaml = r#"
assignment:
  tenant_id: acme
  treatment_id: weight_loss
  personalization_template_id: basics
  account_template_id: account_default
  doctor_template_id: screening
  layout: layout_b
  theme_id: spring
"#;
        let assignment = AssignmentParser::parse(yaml).unwrap();
        assert_eq!(assignment.layout, Layout::LayoutB);
        assert_eq!(assignment.theme_id.as_deref(), Some("spring"));
        assert_eq!(assignment.template_for(SectionType::Personalization), "basics");
    }

    #[test]
    fn test_missing_document_key() {
        let err = AssignmentParser::parse("tenant_id: acme").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { .. }));
    }
}
