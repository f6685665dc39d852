//! Shared fixtures for SDK integration tests

#![allow(dead_code)]

use std::sync::Arc;

use intake_core::ast::{
    Layout, RiskLevel, SectionType, Step, StepOption, Template, TemplateAssignment,
    TemplateOwnership,
};
use intake_repository::InMemoryRepository;
use intake_sdk::{EngineConfig, FlowEngine, RepositoryConfig};
use serde_json::json;

pub const TENANT: &str = "acme";
pub const TREATMENT: &str = "weight_loss";

/// P: two plain steps
pub fn personalization() -> Template {
    Template::new("basics", "Basics", SectionType::Personalization, TemplateOwnership::Global)
        .with_step(Step::new("first_name", SectionType::Personalization).with_position(1))
        .with_step(Step::new("goal", SectionType::Personalization).with_position(2))
}

/// A: one required step, owned by the tenant
pub fn account() -> Template {
    Template::new(
        "acme_account",
        "Acme account",
        SectionType::Account,
        TemplateOwnership::Tenant(TENANT.to_string()),
    )
    .with_step(Step::new("email", SectionType::Account).with_position(1))
}

/// D: a screening question whose reject option leads to a dead-end, and a
/// follow-up shown otherwise
pub fn doctor() -> Template {
    Template::new("screening", "Screening", SectionType::Doctor, TemplateOwnership::Global)
        .with_step(
            Step::new("heart_condition", SectionType::Doctor)
                .with_position(1)
                .with_option(StepOption::new("x", "Yes").with_risk(RiskLevel::Reject))
                .with_option(StepOption::new("none", "No").with_risk(RiskLevel::Safe)),
        )
        .with_step(
            Step::new("not_eligible", SectionType::Doctor)
                .with_position(2)
                .dead_end()
                .with_logic(json!({"step": "heart_condition", "op": "equals", "value": "x"})),
        )
        .with_step(
            Step::new("medications", SectionType::Doctor)
                .with_position(3)
                .with_option(StepOption::new("none", "None"))
                .with_option(StepOption::new("insulin", "Insulin").with_risk(RiskLevel::Review)),
        )
}

pub fn assignment(layout: Layout) -> TemplateAssignment {
    TemplateAssignment {
        tenant_id: TENANT.to_string(),
        treatment_id: TREATMENT.to_string(),
        personalization_template_id: "basics".to_string(),
        account_template_id: "acme_account".to_string(),
        doctor_template_id: "screening".to_string(),
        layout,
        theme_id: Some("spring".to_string()),
    }
}

pub fn repository(layout: Layout) -> InMemoryRepository {
    InMemoryRepository::new()
        .with_template(personalization())
        .with_template(account())
        .with_template(doctor())
        .with_assignment(assignment(layout))
}

pub fn engine(layout: Layout) -> FlowEngine {
    FlowEngine::new(
        Arc::new(repository(layout)),
        EngineConfig::new().with_repository(RepositoryConfig::memory()),
    )
}
