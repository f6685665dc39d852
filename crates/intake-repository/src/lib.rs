//! Storage layer for the intake flow engine
//!
//! The engine reads two kinds of documents through the [`TemplateRepository`]
//! trait: section templates (steps plus ownership) and per-tenant treatment
//! assignments (which template fills each section slot, layout, theme).
//!
//! # Backends
//!
//! - [`FileSystemRepository`]: YAML documents on disk, TTL-cached
//! - [`InMemoryRepository`]: documents registered at runtime
//!
//! # Quick Start
//!
//! ```no_run
//! use intake_repository::{CacheableRepository, FileSystemRepository, TemplateRepository};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repo = FileSystemRepository::new("repository")?;
//!
//!     for id in repo.list_templates().await? {
//!         let template = repo.load_template(&id).await?;
//!         println!("{} ({}): {} steps", template.id, template.section, template.steps.len());
//!     }
//!
//!     let stats = repo.cache_stats();
//!     println!("Cache hit rate: {:.2}%", stats.hit_rate() * 100.0);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod traits;

// Re-exports - Configuration
pub use cache::{CacheConfig, CacheStats};
pub use config::{ConfigError, RepositoryConfig, RepositorySource};

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Repositories
pub use file_system::FileSystemRepository;
pub use memory::InMemoryRepository;
pub use traits::{CacheableRepository, TemplateRepository};
