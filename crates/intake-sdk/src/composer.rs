//! Template Composer: assembles one questionnaire from a treatment's assignment
//!
//! Composition resolves the three section templates, checks ownership and slot
//! types, concatenates their steps personalization → account → doctor,
//! renumbers positions, applies the assignment's layout and builds the
//! [`StepGraph`]. Source templates are only read; steps are copied.

use std::sync::Arc;

use intake_core::ast::{Layout, SectionType, Step, Template, TemplateAssignment};
use intake_core::{AnswerSet, TenantId, TreatmentId};
use intake_repository::{RepositoryError, TemplateRepository};
use intake_runtime::{FlowSession, RiskAggregator, RiskAssessment, StepGraph};

use crate::error::{Result, SdkError};

/// A composed questionnaire: the step graph plus presentation settings
#[derive(Debug, Clone)]
pub struct Questionnaire {
    pub tenant_id: TenantId,
    pub treatment_id: TreatmentId,
    pub layout: Layout,
    pub theme_id: Option<String>,
    graph: Arc<StepGraph>,
}

impl Questionnaire {
    pub fn graph(&self) -> &Arc<StepGraph> {
        &self.graph
    }

    /// Start a new patient session on this questionnaire
    pub fn start(&self) -> FlowSession {
        FlowSession::start(Arc::clone(&self.graph))
    }

    /// Rebuild a session from persisted answers
    pub fn resume(&self, answers: AnswerSet) -> FlowSession {
        FlowSession::resume(Arc::clone(&self.graph), answers)
    }

    pub fn assess(&self, answers: &AnswerSet) -> RiskAssessment {
        RiskAggregator::assess_detailed(answers, &self.graph)
    }
}

/// Builds questionnaires from templates held by a [`TemplateRepository`]
#[derive(Clone)]
pub struct TemplateComposer {
    repository: Arc<dyn TemplateRepository>,
    strict_warnings: bool,
}

impl TemplateComposer {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self {
            repository,
            strict_warnings: false,
        }
    }

    /// Refuse questionnaires whose graph has authoring warnings
    pub fn with_strict_warnings(mut self, strict: bool) -> Self {
        self.strict_warnings = strict;
        self
    }

    /// Compose the questionnaire of `treatment_id` for `tenant_id`.
    ///
    /// An unknown assignment is a not-found error. Everything that goes wrong
    /// after the assignment is found (missing, foreign or mistyped template,
    /// malformed conditional logic) is a configuration error.
    pub async fn compose(&self, tenant_id: &str, treatment_id: &str) -> Result<Questionnaire> {
        tracing::debug!(tenant_id, treatment_id, "composing questionnaire");

        let assignment = self
            .repository
            .load_assignment(tenant_id, treatment_id)
            .await?;

        let mut templates = Vec::with_capacity(SectionType::ORDERED.len());
        for section in SectionType::ORDERED {
            let template_id = assignment.template_for(section);
            let template = self
                .repository
                .load_template(template_id)
                .await
                .map_err(|e| match e {
                    RepositoryError::TemplateNotFound { template_id } => {
                        SdkError::MissingTemplate {
                            template_id,
                            section,
                        }
                    }
                    other => other.into(),
                })?;
            templates.push(template);
        }

        let questionnaire = self.build(tenant_id, &assignment, &templates)?;
        tracing::info!(
            tenant_id,
            treatment_id,
            layout = %questionnaire.layout,
            steps = questionnaire.graph.len(),
            warnings = questionnaire.graph.warnings().len(),
            "questionnaire composed"
        );
        Ok(questionnaire)
    }

    /// Compose from an assignment and already-loaded templates
    pub fn build(
        &self,
        tenant_id: &str,
        assignment: &TemplateAssignment,
        templates: &[Template],
    ) -> Result<Questionnaire> {
        let steps = compose_steps(tenant_id, assignment, templates)?;
        let graph = StepGraph::new(steps)?;

        if self.strict_warnings && !graph.warnings().is_empty() {
            return Err(SdkError::StrictWarnings(graph.warnings().to_vec()));
        }

        Ok(Questionnaire {
            tenant_id: tenant_id.to_string(),
            treatment_id: assignment.treatment_id.clone(),
            layout: assignment.layout,
            theme_id: assignment.theme_id.clone(),
            graph: Arc::new(graph),
        })
    }
}

/// Ordered steps of the questionnaire described by `assignment`.
///
/// `templates` must contain the three assigned templates (in any order; extra
/// templates are ignored). The returned steps are copies with the section of
/// their template and contiguous positions starting at 1.
pub fn compose_steps(
    tenant_id: &str,
    assignment: &TemplateAssignment,
    templates: &[Template],
) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for section in SectionType::ORDERED {
        let template_id = assignment.template_for(section);
        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| SdkError::MissingTemplate {
                template_id: template_id.to_string(),
                section,
            })?;

        if !template.ownership.visible_to(tenant_id) {
            return Err(SdkError::CrossTenantTemplate {
                template_id: template.id.clone(),
                owner: template.ownership.tenant().unwrap_or_default().to_string(),
                tenant_id: tenant_id.to_string(),
            });
        }
        if template.section != section {
            return Err(SdkError::SectionMismatch {
                template_id: template.id.clone(),
                expected: section,
                actual: template.section,
            });
        }

        let mut section_steps: Vec<Step> = template.steps.to_vec();
        section_steps.sort_by_key(|s| s.position);
        steps.extend(section_steps.into_iter().map(|mut step| {
            step.section = section;
            step
        }));
    }

    renumber(&mut steps);
    let mut steps = apply_layout(assignment.layout, steps);
    renumber(&mut steps);
    Ok(steps)
}

/// Reorder composed steps for a layout. Every reordering is stable.
pub fn apply_layout(layout: Layout, steps: Vec<Step>) -> Vec<Step> {
    match layout {
        Layout::LayoutA => steps,
        Layout::LayoutB => {
            let mut steps = steps;
            steps.sort_by_key(|s| match s.section {
                SectionType::Account => 0,
                SectionType::Personalization => 1,
                SectionType::Doctor => 2,
            });
            steps
        }
        Layout::LayoutC => {
            let (front, rest): (Vec<Step>, Vec<Step>) = steps
                .into_iter()
                .partition(|s| s.section == SectionType::Doctor && s.needs_answer());
            front.into_iter().chain(rest).collect()
        }
    }
}

fn renumber(steps: &mut [Step]) {
    for (i, step) in steps.iter_mut().enumerate() {
        step.position = i as u32 + 1;
    }
}
