//! Template composition through the engine and its repositories

mod common;

use std::sync::Arc;

use common::{TENANT, TREATMENT};
use intake_core::ast::{Layout, SectionType, Step, Template, TemplateOwnership};
use intake_sdk::{
    EngineConfig, ErrorKind, FlowEngine, FlowEngineBuilder, RepositoryConfig, SdkError,
    TemplateComposer,
};
use serde_json::json;
use tempfile::TempDir;

fn step_ids(questionnaire: &intake_sdk::Questionnaire) -> Vec<String> {
    questionnaire.graph().steps().map(|s| s.id.clone()).collect()
}

#[tokio::test]
async fn test_compose_layout_a() {
    let engine = common::engine(Layout::LayoutA);
    let questionnaire = engine.questionnaire(TENANT, TREATMENT).await.unwrap();

    assert_eq!(
        step_ids(&questionnaire),
        vec!["first_name", "goal", "email", "heart_condition", "not_eligible", "medications"]
    );
    assert_eq!(questionnaire.layout, Layout::LayoutA);
    assert_eq!(questionnaire.theme_id.as_deref(), Some("spring"));
    assert!(questionnaire.graph().warnings().is_empty());

    let positions: Vec<u32> = questionnaire.graph().steps().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_compose_layout_b_puts_account_first() {
    let engine = common::engine(Layout::LayoutB);
    let questionnaire = engine.questionnaire(TENANT, TREATMENT).await.unwrap();

    assert_eq!(
        step_ids(&questionnaire),
        vec!["email", "first_name", "goal", "heart_condition", "not_eligible", "medications"]
    );
}

#[tokio::test]
async fn test_compose_layout_c_moves_required_doctor_steps_first() {
    let engine = common::engine(Layout::LayoutC);
    let questionnaire = engine.questionnaire(TENANT, TREATMENT).await.unwrap();

    assert_eq!(
        step_ids(&questionnaire),
        vec!["heart_condition", "not_eligible", "medications", "first_name", "goal", "email"]
    );
}

#[tokio::test]
async fn test_composing_twice_is_structurally_equal() {
    let repository = Arc::new(common::repository(Layout::LayoutC));
    let composer = TemplateComposer::new(repository.clone());

    let first = composer.compose(TENANT, TREATMENT).await.unwrap();
    let second = composer.compose(TENANT, TREATMENT).await.unwrap();
    assert_eq!(first.graph().as_ref(), second.graph().as_ref());

    // Stored templates keep their authored shape
    use intake_sdk::TemplateRepository;
    assert_eq!(repository.load_template("screening").await.unwrap(), common::doctor());
}

#[tokio::test]
async fn test_unknown_assignment_is_not_found() {
    let engine = common::engine(Layout::LayoutA);
    let err = engine.questionnaire(TENANT, "hair_loss").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine.start_session("globex", TREATMENT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_template_is_configuration_error() {
    let repository = common::repository(Layout::LayoutA);
    repository.remove_template("acme_account").await;
    let engine = FlowEngine::new(Arc::new(repository), EngineConfig::default());

    let err = engine.questionnaire(TENANT, TREATMENT).await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::MissingTemplate { section: SectionType::Account, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_cross_tenant_template_is_configuration_error() {
    let repository = common::repository(Layout::LayoutA);
    let mut foreign = common::assignment(Layout::LayoutA);
    foreign.tenant_id = "globex".to_string();
    repository.insert_assignment(foreign).await;
    let engine = FlowEngine::new(Arc::new(repository), EngineConfig::default());

    let err = engine.questionnaire("globex", TREATMENT).await.unwrap_err();
    assert!(matches!(err, SdkError::CrossTenantTemplate { ref owner, .. } if owner == TENANT));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_malformed_logic_is_configuration_error() {
    let broken = Template::new("screening", "Broken", SectionType::Doctor, TemplateOwnership::Global)
        .with_step(
            Step::new("q", SectionType::Doctor).with_logic(json!({"all": []})),
        );
    let repository = common::repository(Layout::LayoutA);
    repository.insert_template(broken).await;
    let engine = FlowEngine::new(Arc::new(repository), EngineConfig::default());

    let err = engine.questionnaire(TENANT, TREATMENT).await.unwrap_err();
    assert!(matches!(err, SdkError::RuntimeError(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_strict_warnings() {
    let dangling = Template::new("screening", "Dangling", SectionType::Doctor, TemplateOwnership::Global)
        .with_step(Step::new("q", SectionType::Doctor).with_logic(json!("ghost == yes")));
    let repository = Arc::new(common::repository(Layout::LayoutA));
    repository.insert_template(dangling).await;

    let lenient = FlowEngineBuilder::new()
        .with_repository(repository.clone())
        .build()
        .unwrap();
    let questionnaire = lenient.questionnaire(TENANT, TREATMENT).await.unwrap();
    assert_eq!(questionnaire.graph().warnings().len(), 1);

    let strict = FlowEngineBuilder::new()
        .with_repository(repository)
        .strict_warnings(true)
        .build()
        .unwrap();
    let err = strict.questionnaire(TENANT, TREATMENT).await.unwrap_err();
    assert!(matches!(err, SdkError::StrictWarnings(ref w) if w.len() == 1));
}

#[tokio::test]
async fn test_file_system_engine() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("templates")).unwrap();
    std::fs::create_dir_all(root.join("assignments/acme")).unwrap();

    for template in [common::personalization(), common::account(), common::doctor()] {
        let doc = serde_yaml::to_string(&serde_json::json!({ "template": template })).unwrap();
        std::fs::write(root.join(format!("templates/{}.yaml", template.id)), doc).unwrap();
    }
    let doc = serde_yaml::to_string(&serde_json::json!({
        "assignment": common::assignment(Layout::LayoutB)
    }))
    .unwrap();
    std::fs::write(root.join("assignments/acme/weight_loss.yaml"), doc).unwrap();

    let engine = FlowEngineBuilder::new()
        .with_repository_config(RepositoryConfig::file_system(root.to_string_lossy()))
        .build()
        .unwrap();

    let questionnaire = engine.questionnaire(TENANT, TREATMENT).await.unwrap();
    assert_eq!(step_ids(&questionnaire)[0], "email");
    assert_eq!(questionnaire.graph().len(), 6);
}

#[tokio::test]
async fn test_unparseable_template_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("templates")).unwrap();
    std::fs::create_dir_all(root.join("assignments/acme")).unwrap();

    for template in [common::personalization(), common::account()] {
        let doc = serde_yaml::to_string(&json!({ "template": template })).unwrap();
        std::fs::write(root.join(format!("templates/{}.yaml", template.id)), doc).unwrap();
    }
    std::fs::write(
        root.join("templates/screening.yaml"),
        "template:\n  id: screening\n  section: doctor\n  ownership: { planet: mars }\n",
    )
    .unwrap();
    let doc = serde_yaml::to_string(&json!({
        "assignment": common::assignment(Layout::LayoutA)
    }))
    .unwrap();
    std::fs::write(root.join("assignments/acme/weight_loss.yaml"), doc).unwrap();

    let engine = FlowEngineBuilder::new()
        .with_repository_config(RepositoryConfig::file_system(root.to_string_lossy()))
        .build()
        .unwrap();

    let err = engine.questionnaire(TENANT, TREATMENT).await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::RepositoryError(intake_repository::RepositoryError::Parse { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
