//! Collaborator interfaces through which the engine reads templates
//!
//! - [`TemplateRepository`]: read-only access to templates and assignments
//! - [`CacheableRepository`]: cache management for backends that cache
//!
//! ```no_run
//! use intake_repository::{FileSystemRepository, TemplateRepository};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let repo = FileSystemRepository::new("repository")?;
//!
//! let assignment = repo.load_assignment("acme", "weight_loss").await?;
//! let doctor = repo.load_template(&assignment.doctor_template_id).await?;
//! println!("{} has {} steps", doctor.id, doctor.steps.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use intake_core::ast::{Template, TemplateAssignment};

use crate::{CacheStats, RepositoryError, RepositoryResult};

/// Read access to questionnaire templates and per-tenant assignments
///
/// Implementations return owned copies; callers are free to modify what they
/// receive without affecting storage. All implementations must be
/// `Send + Sync` so one repository can serve concurrent sessions.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Load a template by id
    ///
    /// Returns [`RepositoryError::TemplateNotFound`] when nothing is stored
    /// under `template_id`.
    async fn load_template(&self, template_id: &str) -> RepositoryResult<Template>;

    /// Load the assignment of a (tenant, treatment) pair
    ///
    /// Returns [`RepositoryError::AssignmentNotFound`] when the pair has no
    /// assignment.
    async fn load_assignment(
        &self,
        tenant_id: &str,
        treatment_id: &str,
    ) -> RepositoryResult<TemplateAssignment>;

    /// Ids of every stored template, sorted
    async fn list_templates(&self) -> RepositoryResult<Vec<String>>;

    /// Treatment ids that have an assignment for `tenant_id`, sorted
    async fn list_treatments(&self, tenant_id: &str) -> RepositoryResult<Vec<String>>;

    /// Whether a template exists
    async fn template_exists(&self, template_id: &str) -> RepositoryResult<bool> {
        match self.load_template(template_id).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::TemplateNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Cache management for repositories that keep parsed documents in memory
#[async_trait]
pub trait CacheableRepository: TemplateRepository {
    /// Drop every cached document
    async fn clear_cache(&self);

    /// Drop one cached template
    async fn clear_template(&self, template_id: &str);

    /// Current cache statistics
    fn cache_stats(&self) -> CacheStats;

    /// Whether caching is enabled
    fn is_cache_enabled(&self) -> bool;
}
