//! Unit tests for FileSystemRepository
//!
//! These tests focus on document lookup, caching behaviour and error mapping.

use std::time::Duration;

use intake_core::ast::{Layout, SectionType, TemplateOwnership};
use intake_repository::{
    CacheConfig, CacheableRepository, FileSystemRepository, RepositoryError, TemplateRepository,
};
use tempfile::TempDir;
use tokio::fs;

const SCREENING: &str = r#"
template:
  id: screening
  name: Weight loss screening
  section: doctor
  ownership: global
  steps:
    - id: heart
      options:
        - { id: "yes", label: "Yes", risk_level: reject }
        - { id: "no", label: "No" }
    - id: stop
      dead_end: true
      conditional_logic: heart == "yes"
"#;

const ACME_ACCOUNT: &str = r#"
template:
  id: acme_account
  name: Acme account
  section: account
  is_global: false
  tenant_id: acme
  steps:
    - id: email
"#;

const ASSIGNMENT: &str = r#"
assignment:
  tenant_id: acme
  treatment_id: weight_loss
  personalization_template_id: basics
  account_template_id: acme_account
  doctor_template_id: screening
  layout: layout_c
  theme_id: spring
"#;

/// Helper function to create a test repository with sample files
async fn create_test_repo(config: CacheConfig) -> (TempDir, FileSystemRepository) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("templates/doctor")).await.unwrap();
    fs::create_dir_all(root.join("assignments/acme")).await.unwrap();

    fs::write(root.join("templates/doctor/screening.yaml"), SCREENING)
        .await
        .unwrap();
    // File name differs from the id; found by search
    fs::write(root.join("templates/account.yml"), ACME_ACCOUNT)
        .await
        .unwrap();
    fs::write(root.join("assignments/acme/weight_loss.yaml"), ASSIGNMENT)
        .await
        .unwrap();

    let repo = FileSystemRepository::with_cache_config(root, config).unwrap();
    (temp_dir, repo)
}

#[tokio::test]
async fn test_load_template_by_id() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;

    let template = repo.load_template("screening").await.unwrap();
    assert_eq!(template.section, SectionType::Doctor);
    assert_eq!(template.ownership, TemplateOwnership::Global);
    assert_eq!(template.steps.len(), 2);
    assert!(template.steps[1].dead_end);

    let account = repo.load_template("acme_account").await.unwrap();
    assert_eq!(account.ownership, TemplateOwnership::Tenant("acme".to_string()));
}

#[tokio::test]
async fn test_missing_template_is_not_found() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;

    let err = repo.load_template("basics").await.unwrap_err();
    assert!(matches!(err, RepositoryError::TemplateNotFound { ref template_id } if template_id == "basics"));
    assert!(!repo.template_exists("basics").await.unwrap());
}

#[tokio::test]
async fn test_load_assignment() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;

    let assignment = repo.load_assignment("acme", "weight_loss").await.unwrap();
    assert_eq!(assignment.layout, Layout::LayoutC);
    assert_eq!(assignment.theme_id.as_deref(), Some("spring"));
    assert_eq!(assignment.doctor_template_id, "screening");

    let err = repo.load_assignment("acme", "hair_loss").await.unwrap_err();
    assert!(err.is_not_found());
    let err = repo.load_assignment("globex", "weight_loss").await.unwrap_err();
    assert!(matches!(err, RepositoryError::AssignmentNotFound { .. }));
}

#[tokio::test]
async fn test_path_traversal_is_refused() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;

    let err = repo.load_template("../secrets").await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidIdentifier(_)));
    let err = repo.load_assignment("..", "weight_loss").await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidIdentifier(_)));
}

#[tokio::test]
async fn test_malformed_document_is_parse_error() {
    let (dir, repo) = create_test_repo(CacheConfig::default()).await;
    fs::write(
        dir.path().join("templates/broken.yaml"),
        "template:\n  id: broken\n  section: nowhere\n",
    )
    .await
    .unwrap();

    let err = repo.load_template("broken").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Parse { .. }));
}

#[tokio::test]
async fn test_listing() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;

    assert_eq!(
        repo.list_templates().await.unwrap(),
        vec!["acme_account", "screening"]
    );
    assert_eq!(repo.list_treatments("acme").await.unwrap(), vec!["weight_loss"]);
    assert!(repo.list_treatments("globex").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_hits_and_clear() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;
    assert!(repo.is_cache_enabled());

    repo.load_template("screening").await.unwrap();
    repo.load_template("screening").await.unwrap();
    repo.load_assignment("acme", "weight_loss").await.unwrap();

    let stats = repo.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.entries, 2);

    repo.clear_template("screening").await;
    assert_eq!(repo.cache_stats().entries, 1);

    repo.clear_cache().await;
    assert_eq!(repo.cache_stats().entries, 0);
    repo.load_template("screening").await.unwrap();
    assert_eq!(repo.cache_stats().misses, 3);
}

#[tokio::test]
async fn test_cache_sees_edits_after_expiry() {
    let config = CacheConfig::default().with_ttl(Duration::from_millis(20));
    let (dir, repo) = create_test_repo(config).await;

    let first = repo.load_template("screening").await.unwrap();
    assert_eq!(first.name, "Weight loss screening");

    fs::write(
        dir.path().join("templates/doctor/screening.yaml"),
        SCREENING.replace("Weight loss screening", "Updated screening"),
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    let second = repo.load_template("screening").await.unwrap();
    assert_eq!(second.name, "Updated screening");
}

#[tokio::test]
async fn test_disabled_cache_always_reads() {
    let (_dir, repo) = create_test_repo(CacheConfig::disabled()).await;
    assert!(!repo.is_cache_enabled());

    repo.load_template("screening").await.unwrap();
    repo.load_template("screening").await.unwrap();
    assert_eq!(repo.cache_stats().hits, 0);
    assert_eq!(repo.cache_stats().entries, 0);
}

#[tokio::test]
async fn test_capacity_evicts_oldest() {
    let (_dir, repo) = create_test_repo(CacheConfig::default().with_capacity(Some(1))).await;

    repo.load_template("screening").await.unwrap();
    repo.load_template("acme_account").await.unwrap();
    assert_eq!(repo.cache_stats().entries, 1);

    // screening was evicted
    repo.load_template("screening").await.unwrap();
    assert_eq!(repo.cache_stats().hits, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_entry_count_survives_concurrent_clears() {
    let (_dir, repo) = create_test_repo(CacheConfig::default()).await;
    let repo = std::sync::Arc::new(repo);

    let mut tasks = Vec::new();
    for i in 0..48 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            repo.load_template("screening").await.unwrap();
            repo.load_assignment("acme", "weight_loss").await.unwrap();
            if i % 2 == 0 {
                repo.clear_template("screening").await;
            } else {
                repo.clear_cache().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(repo.cache_stats().entries <= 2);
    repo.clear_template("screening").await;
    repo.clear_cache().await;
    assert_eq!(repo.cache_stats().entries, 0);
}
