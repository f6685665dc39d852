//! Walkthrough: compose a questionnaire from YAML documents and run three
//! patients through it.
//!
//! Run with: cargo run --example walkthrough
//! Set RUST_LOG=intake_runtime=debug to see every navigator transition.

use anyhow::Result;
use intake_core::AnswerValue;
use intake_repository::{CacheableRepository, FileSystemRepository};
use intake_sdk::{EngineConfig, FlowEngine, FlowSession, RepositoryConfig, StepOutcome};
use std::sync::Arc;

const TENANT: &str = "acme";
const TREATMENT: &str = "weight_loss";

fn answer_for(step_id: &str, patient: &Patient) -> Option<AnswerValue> {
    match step_id {
        "first_name" => Some(AnswerValue::text(patient.name)),
        "email" => Some(AnswerValue::text(format!("{}@example.com", patient.name.to_lowercase()))),
        "conditions" => Some(AnswerValue::choices(patient.conditions.iter().copied())),
        "diabetes_medication" => Some(AnswerValue::choice("metformin")),
        "weight" => Some(AnswerValue::text(patient.weight)),
        _ => None,
    }
}

struct Patient {
    name: &'static str,
    conditions: &'static [&'static str],
    weight: &'static str,
}

fn run_patient(session: &mut FlowSession, patient: &Patient) -> Result<()> {
    while let Some(step) = session.current_step().cloned() {
        if session.is_terminal() {
            break;
        }

        let title = step.title.as_deref().unwrap_or(&step.id);
        let transition = match answer_for(&step.id, patient) {
            Some(value) => {
                println!("  [{}] {} -> {:?}", step.position, title, value);
                session.submit_answer(value)?
            }
            None if step.needs_answer() => anyhow::bail!("no scripted answer for {}", step.id),
            None if step.is_informational() => {
                println!("  [{}] {}", step.position, title);
                session.next()?
            }
            None => {
                println!("  [{}] {} (skipped)", step.position, title);
                session.skip()?
            }
        };

        if let StepOutcome::Disqualified(step_id) = &transition.outcome {
            println!("  !! disqualified at {}", step_id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/repository");
    let config = EngineConfig::new().with_repository(RepositoryConfig::file_system(root));
    intake_sdk::telemetry::init_tracing(&config)?;

    let repository = Arc::new(FileSystemRepository::with_cache_config(
        root,
        config.cache.to_cache_config(),
    )?);
    let engine = FlowEngine::new(repository.clone(), config);

    let questionnaire = engine.questionnaire(TENANT, TREATMENT).await?;
    println!(
        "Questionnaire {}/{}: {} steps, {}, theme {:?}",
        TENANT,
        TREATMENT,
        questionnaire.graph().len(),
        questionnaire.layout,
        questionnaire.theme_id
    );
    for warning in questionnaire.graph().warnings() {
        println!("  warning: {}", warning);
    }

    let patients = [
        Patient {
            name: "Ada",
            conditions: &["none"],
            weight: "82",
        },
        Patient {
            name: "Grace",
            conditions: &["diabetes"],
            weight: "55",
        },
        Patient {
            name: "Linus",
            conditions: &["heart", "diabetes"],
            weight: "90",
        },
    ];

    for patient in &patients {
        println!("\n{}:", patient.name);
        let mut session = engine.start_session(TENANT, TREATMENT).await?;
        run_patient(&mut session, patient)?;

        let submission = engine.submit(&session)?;
        println!(
            "  => {} / {} ({} flag(s))",
            submission.state,
            submission.assessment.disposition,
            submission.assessment.flags.len()
        );
        println!("  {}", serde_json::to_string(&submission.assessment)?);
    }

    let stats = repository.cache_stats();
    println!(
        "\nRepository cache: {} hits, {} misses ({:.0}% hit rate)",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );
    Ok(())
}
