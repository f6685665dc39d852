//! Builder pattern for FlowEngine

use std::sync::Arc;

use intake_core::ast::{Template, TemplateAssignment};
use intake_repository::{
    FileSystemRepository, InMemoryRepository, RepositoryConfig, RepositorySource,
    TemplateRepository,
};

use crate::config::{CacheSettings, EngineConfig};
use crate::error::{Result, SdkError};
use crate::flow_engine::FlowEngine;

/// Builder for FlowEngine
///
/// ```rust,no_run
/// use intake_sdk::FlowEngineBuilder;
/// use intake_repository::RepositoryConfig;
///
/// # fn main() -> intake_sdk::Result<()> {
/// let engine = FlowEngineBuilder::new()
///     .with_repository_config(RepositoryConfig::file_system("repository"))
///     .strict_warnings(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct FlowEngineBuilder {
    config: EngineConfig,
    repository: Option<Arc<dyn TemplateRepository>>,
    templates: Vec<Template>,
    assignments: Vec<TemplateAssignment>,
}

impl FlowEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set where templates and assignments are read from
    pub fn with_repository_config(mut self, repository: RepositoryConfig) -> Self {
        self.config.repository = repository;
        self
    }

    /// Use an existing repository instead of building one from configuration
    pub fn with_repository(mut self, repository: Arc<dyn TemplateRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Register a template with the in-memory repository
    pub fn add_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    /// Register an assignment with the in-memory repository
    pub fn add_assignment(mut self, assignment: TemplateAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.config.cache = cache;
        self
    }

    /// Treat authoring warnings as configuration errors
    pub fn strict_warnings(mut self, strict: bool) -> Self {
        self.config.strict_warnings = strict;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<FlowEngine> {
        let repository = match self.repository {
            Some(repository) => {
                if !self.templates.is_empty() || !self.assignments.is_empty() {
                    return Err(SdkError::ConfigError(
                        "documents can only be added to the in-memory repository".to_string(),
                    ));
                }
                repository
            }
            None => Self::build_repository(&self.config, self.templates, self.assignments)?,
        };

        tracing::debug!(
            source = ?self.config.repository.source,
            strict_warnings = self.config.strict_warnings,
            "flow engine built"
        );
        Ok(FlowEngine::new(repository, self.config))
    }

    fn build_repository(
        config: &EngineConfig,
        templates: Vec<Template>,
        assignments: Vec<TemplateAssignment>,
    ) -> Result<Arc<dyn TemplateRepository>> {
        config.repository.validate()?;

        match config.repository.source {
            RepositorySource::FileSystem => {
                if !templates.is_empty() || !assignments.is_empty() {
                    return Err(SdkError::ConfigError(
                        "documents can only be added to the in-memory repository".to_string(),
                    ));
                }
                let base_path = config.repository.base_path.as_deref().unwrap_or_default();
                let repo = FileSystemRepository::with_cache_config(
                    base_path,
                    config.cache.to_cache_config(),
                )?;
                Ok(Arc::new(repo))
            }
            RepositorySource::Memory => {
                let repo = templates
                    .into_iter()
                    .fold(InMemoryRepository::new(), InMemoryRepository::with_template);
                let repo = assignments
                    .into_iter()
                    .fold(repo, InMemoryRepository::with_assignment);
                Ok(Arc::new(repo))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::ast::{SectionType, TemplateOwnership};
    use intake_repository::RepositoryConfig;

    #[test]
    fn test_documents_require_memory_source() {
        let result = FlowEngineBuilder::new()
            .with_repository_config(RepositoryConfig::file_system("."))
            .add_template(Template::new(
                "p",
                "P",
                SectionType::Personalization,
                TemplateOwnership::Global,
            ))
            .build();
        assert!(matches!(result, Err(SdkError::ConfigError(_))));
    }

    #[test]
    fn test_missing_directory() {
        let result = FlowEngineBuilder::new()
            .with_repository_config(RepositoryConfig::file_system("/no/such/intake/repo"))
            .build();
        assert!(matches!(result, Err(SdkError::RepositoryError(_))));
    }

    #[test]
    fn test_memory_engine() {
        let engine = FlowEngineBuilder::new()
            .with_repository_config(RepositoryConfig::memory())
            .strict_warnings(true)
            .build()
            .unwrap();
        assert!(engine.config().strict_warnings);
    }
}
