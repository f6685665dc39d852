//! FlowEngine - Main API for running intake questionnaires

use std::sync::Arc;

use intake_core::AnswerSet;
use intake_repository::TemplateRepository;
use intake_runtime::{FlowSession, FlowState, RiskAggregator, RiskAssessment};
use serde::Serialize;

use crate::composer::{Questionnaire, TemplateComposer};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};

/// Final outcome of a session, handed to downstream review routing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub state: FlowState,
    pub assessment: RiskAssessment,
    /// Answers of reachable steps; the ones that count for review
    pub answers: AnswerSet,
}

/// Main flow engine
///
/// Holds no per-patient state: every session owns its answers, and questionnaires
/// are composed fresh from the repository on each call.
pub struct FlowEngine {
    composer: TemplateComposer,
    repository: Arc<dyn TemplateRepository>,
    config: EngineConfig,
}

impl FlowEngine {
    /// Create an engine over an existing repository
    pub fn new(repository: Arc<dyn TemplateRepository>, config: EngineConfig) -> Self {
        let composer =
            TemplateComposer::new(Arc::clone(&repository)).with_strict_warnings(config.strict_warnings);
        Self {
            composer,
            repository,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn TemplateRepository> {
        &self.repository
    }

    pub fn composer(&self) -> &TemplateComposer {
        &self.composer
    }

    /// Compose the questionnaire of a treatment
    pub async fn questionnaire(&self, tenant_id: &str, treatment_id: &str) -> Result<Questionnaire> {
        self.composer.compose(tenant_id, treatment_id).await
    }

    /// Start a new session for a patient
    pub async fn start_session(&self, tenant_id: &str, treatment_id: &str) -> Result<FlowSession> {
        let session = self.questionnaire(tenant_id, treatment_id).await?.start();
        tracing::debug!(
            tenant_id,
            treatment_id,
            state = %session.state(),
            "session started"
        );
        Ok(session)
    }

    /// Rebuild a session from answers persisted by the caller
    pub async fn resume_session(
        &self,
        tenant_id: &str,
        treatment_id: &str,
        answers: AnswerSet,
    ) -> Result<FlowSession> {
        Ok(self
            .questionnaire(tenant_id, treatment_id)
            .await?
            .resume(answers))
    }

    /// Current risk assessment of a session; valid at any point of the flow
    pub fn assess(&self, session: &FlowSession) -> RiskAssessment {
        RiskAggregator::assess_session(session)
    }

    /// Final disposition of a finished session
    pub fn submit(&self, session: &FlowSession) -> Result<Submission> {
        if !session.is_terminal() {
            let step_id = session
                .current_step()
                .map(|s| s.id.clone())
                .unwrap_or_default();
            return Err(SdkError::SessionInProgress(step_id));
        }

        let assessment = RiskAggregator::assess_session(session);
        tracing::info!(
            state = %session.state(),
            disposition = %assessment.disposition,
            flags = assessment.flags.len(),
            "session submitted"
        );

        Ok(Submission {
            state: session.state(),
            assessment,
            answers: session.visible_answers(),
        })
    }
}
