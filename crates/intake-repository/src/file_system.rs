//! File system based repository implementation
//!
//! Expected layout under the root directory:
//!
//! ```text
//! templates/**/<template_id>.yaml
//! assignments/<tenant_id>/<treatment_id>.yaml
//! ```
//!
//! A template whose file name differs from its id is still found by a
//! recursive search of `templates/`.

use async_trait::async_trait;
use intake_core::ast::{Template, TemplateAssignment};
use intake_parser::{AssignmentParser, TemplateParser};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

use crate::cache::DocumentCache;
use crate::traits::{CacheableRepository, TemplateRepository};
use crate::{CacheConfig, CacheStats, RepositoryError, RepositoryResult};

const TEMPLATES_DIR: &str = "templates";
const ASSIGNMENTS_DIR: &str = "assignments";
const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// File system based repository
///
/// Loads templates and assignments from YAML files on disk with optional
/// TTL caching of the parsed documents.
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    template_cache: DocumentCache<Template>,
    assignment_cache: DocumentCache<TemplateAssignment>,
    cache_config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FileSystemRepository {
    /// Create a new file system repository with the default cache configuration
    ///
    /// ```no_run
    /// use intake_repository::FileSystemRepository;
    ///
    /// let repo = FileSystemRepository::new("repository").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        Self::with_cache_config(root_path, CacheConfig::default())
    }

    /// Create a new file system repository with custom cache configuration
    pub fn with_cache_config<P: AsRef<Path>>(
        root_path: P,
        config: CacheConfig,
    ) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        tracing::debug!(root = %abs_path.display(), cache = config.enabled, "file system repository opened");

        Ok(Self {
            root_path: abs_path,
            template_cache: DocumentCache::new(),
            assignment_cache: DocumentCache::new(),
            cache_config: config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Ids become file names; anything that could leave the directory is refused
    fn validate_identifier(id: &str) -> RepositoryResult<()> {
        let invalid = id.trim().is_empty()
            || id.contains(['/', '\\'])
            || id == "."
            || id == ".."
            || id.starts_with('.');
        if invalid {
            return Err(RepositoryError::InvalidIdentifier(id.to_string()));
        }
        Ok(())
    }

    /// First existing `<dir>/<stem>.yaml` or `<dir>/<stem>.yml`
    fn existing_file(dir: &Path, stem: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file())
    }

    fn is_yaml(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| EXTENSIONS.contains(&ext))
    }

    async fn read_template(&self, path: &Path) -> RepositoryResult<Template> {
        let content = fs::read_to_string(path).await?;
        TemplateParser::parse(&content).map_err(|source| RepositoryError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Recursively search `templates/` for a document declaring `id`
    async fn find_template(&self, id: &str) -> RepositoryResult<Option<(PathBuf, Template)>> {
        let dir = self.root_path.join(TEMPLATES_DIR);
        if let Some(path) = Self::existing_file(&dir, id) {
            let template = self.read_template(&path).await?;
            if template.id == id {
                return Ok(Some((path, template)));
            }
        }

        let mut files = Vec::new();
        if dir.is_dir() {
            collect_yaml_files(&dir, &mut files).await?;
        }
        files.sort();

        for path in files {
            let Ok(content) = fs::read_to_string(&path).await else {
                continue;
            };
            // Quick check without full parsing
            if !content.contains(id) {
                continue;
            }
            match TemplateParser::parse(&content) {
                Ok(template) if template.id == id => return Ok(Some((path, template))),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparseable template file");
                }
            }
        }

        Ok(None)
    }

    async fn cached<T: Clone>(&self, cache: &DocumentCache<T>, key: &str) -> Option<T> {
        if !self.cache_config.enabled {
            return None;
        }

        let found = cache.get(key, self.cache_config.ttl).await;
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    async fn remember<T: Clone>(&self, cache: &DocumentCache<T>, key: &str, document: T) {
        if self.cache_config.enabled {
            cache.insert(key, document, &self.cache_config).await;
        }
    }
}

/// Recursively collect YAML files under `dir`
fn collect_yaml_files<'a>(
    dir: &'a Path,
    files: &'a mut Vec<PathBuf>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = RepositoryResult<()>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.is_dir() {
                collect_yaml_files(&path, files).await?;
            } else if FileSystemRepository::is_yaml(&path) {
                files.push(path);
            }
        }

        Ok(())
    })
}

#[async_trait]
impl TemplateRepository for FileSystemRepository {
    async fn load_template(&self, template_id: &str) -> RepositoryResult<Template> {
        Self::validate_identifier(template_id)?;

        if let Some(cached) = self.cached(&self.template_cache, template_id).await {
            return Ok(cached);
        }

        let (path, template) =
            self.find_template(template_id)
                .await?
                .ok_or_else(|| RepositoryError::TemplateNotFound {
                    template_id: template_id.to_string(),
                })?;
        tracing::debug!(template_id, path = %path.display(), "template loaded");

        self.remember(&self.template_cache, template_id, template.clone())
            .await;
        Ok(template)
    }

    async fn load_assignment(
        &self,
        tenant_id: &str,
        treatment_id: &str,
    ) -> RepositoryResult<TemplateAssignment> {
        Self::validate_identifier(tenant_id)?;
        Self::validate_identifier(treatment_id)?;

        let key = format!("{}/{}", tenant_id, treatment_id);
        if let Some(cached) = self.cached(&self.assignment_cache, &key).await {
            return Ok(cached);
        }

        let dir = self.root_path.join(ASSIGNMENTS_DIR).join(tenant_id);
        let path = Self::existing_file(&dir, treatment_id).ok_or_else(|| {
            RepositoryError::AssignmentNotFound {
                tenant_id: tenant_id.to_string(),
                treatment_id: treatment_id.to_string(),
            }
        })?;

        let content = fs::read_to_string(&path).await?;
        let assignment =
            AssignmentParser::parse(&content).map_err(|source| RepositoryError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        if assignment.tenant_id != tenant_id || assignment.treatment_id != treatment_id {
            return Err(RepositoryError::Other(format!(
                "{} declares tenant '{}' and treatment '{}'",
                path.display(),
                assignment.tenant_id,
                assignment.treatment_id
            )));
        }
        tracing::debug!(tenant_id, treatment_id, "assignment loaded");

        self.remember(&self.assignment_cache, &key, assignment.clone())
            .await;
        Ok(assignment)
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<String>> {
        let dir = self.root_path.join(TEMPLATES_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_yaml_files(&dir, &mut files).await?;

        let mut ids = Vec::with_capacity(files.len());
        for path in files {
            match self.read_template(&path).await {
                Ok(template) => ids.push(template.id),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparseable template file");
                }
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn list_treatments(&self, tenant_id: &str) -> RepositoryResult<Vec<String>> {
        Self::validate_identifier(tenant_id)?;

        let dir = self.root_path.join(ASSIGNMENTS_DIR).join(tenant_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::is_yaml(&path) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl CacheableRepository for FileSystemRepository {
    async fn clear_cache(&self) {
        self.template_cache.clear().await;
        self.assignment_cache.clear().await;
        tracing::debug!("repository cache cleared");
    }

    async fn clear_template(&self, template_id: &str) {
        if self.template_cache.remove(template_id).await {
            tracing::debug!(template_id, "template evicted from cache");
        }
    }

    fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.template_cache.entry_count() + self.assignment_cache.entry_count(),
        }
    }

    fn is_cache_enabled(&self) -> bool {
        self.cache_config.enabled
    }
}
