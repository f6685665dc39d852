//! In-memory repository

use std::collections::HashMap;

use async_trait::async_trait;
use intake_core::ast::{Template, TemplateAssignment};
use tokio::sync::RwLock;

use crate::{RepositoryError, RepositoryResult, TemplateRepository};

type AssignmentKey = (String, String);

/// Repository backed by maps held in memory
///
/// Useful for tests and for services that load their documents from elsewhere
/// and register them at startup.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    templates: RwLock<HashMap<String, Template>>,
    assignments: RwLock<HashMap<AssignmentKey, TemplateAssignment>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a template
    pub fn with_template(mut self, template: Template) -> Self {
        self.templates
            .get_mut()
            .insert(template.id.clone(), template);
        self
    }

    /// Builder-style registration of an assignment
    pub fn with_assignment(mut self, assignment: TemplateAssignment) -> Self {
        let key = key(&assignment.tenant_id, &assignment.treatment_id);
        self.assignments.get_mut().insert(key, assignment);
        self
    }

    /// Store or replace a template, returning the previous version
    pub async fn insert_template(&self, template: Template) -> Option<Template> {
        tracing::debug!(template_id = %template.id, "template registered");
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template)
    }

    /// Store or replace an assignment, returning the previous version
    pub async fn insert_assignment(
        &self,
        assignment: TemplateAssignment,
    ) -> Option<TemplateAssignment> {
        tracing::debug!(
            tenant_id = %assignment.tenant_id,
            treatment_id = %assignment.treatment_id,
            "assignment registered"
        );
        self.assignments.write().await.insert(
            key(&assignment.tenant_id, &assignment.treatment_id),
            assignment,
        )
    }

    pub async fn remove_template(&self, template_id: &str) -> Option<Template> {
        self.templates.write().await.remove(template_id)
    }
}

fn key(tenant_id: &str, treatment_id: &str) -> AssignmentKey {
    (tenant_id.to_string(), treatment_id.to_string())
}

#[async_trait]
impl TemplateRepository for InMemoryRepository {
    async fn load_template(&self, template_id: &str) -> RepositoryResult<Template> {
        self.templates
            .read()
            .await
            .get(template_id)
            .cloned()
            .ok_or_else(|| RepositoryError::TemplateNotFound {
                template_id: template_id.to_string(),
            })
    }

    async fn load_assignment(
        &self,
        tenant_id: &str,
        treatment_id: &str,
    ) -> RepositoryResult<TemplateAssignment> {
        self.assignments
            .read()
            .await
            .get(&key(tenant_id, treatment_id))
            .cloned()
            .ok_or_else(|| RepositoryError::AssignmentNotFound {
                tenant_id: tenant_id.to_string(),
                treatment_id: treatment_id.to_string(),
            })
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<String>> {
        let mut ids: Vec<String> = self.templates.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_treatments(&self, tenant_id: &str) -> RepositoryResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .assignments
            .read()
            .await
            .keys()
            .filter(|(tenant, _)| tenant == tenant_id)
            .map(|(_, treatment)| treatment.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
