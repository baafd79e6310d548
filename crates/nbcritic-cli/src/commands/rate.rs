//! The `nbcritic rate` command.

use std::path::PathBuf;

use anyhow::Result;

use nbcritic_core::chat::{ChatClient, TokenUsage};
use nbcritic_core::prompts::PROMPT_VERSION;
use nbcritic_core::records::{Collection, QuestionResult, RatingRecord};
use nbcritic_core::resume::ResumePolicy;
use nbcritic_core::rubric::Rubric;
use nbcritic_core::session;
use nbcritic_core::target::TargetId;
use nbcritic_providers::load_config_from;

use crate::fetch;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    notebooks: Option<PathBuf>,
    notebook: Option<String>,
    prefix: Option<String>,
    rubric_path: PathBuf,
    out: PathBuf,
    repeats: usize,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(repeats >= 1, "repeats must be at least 1");

    let rubric = Rubric::load(&rubric_path)?;
    let config = load_config_from(config_path.as_deref())?;
    let client = super::client_from_config(&config)?;
    let model = model.unwrap_or_else(|| config.models.rating.clone());

    let targets =
        super::resolve_targets(notebooks.as_deref(), notebook.as_deref(), prefix.as_deref())?;
    println!("Found {} notebooks to process", targets.len());

    let mut collection = Collection::<RatingRecord>::load(&out)?;
    let policy = ResumePolicy::new(PROMPT_VERSION, repeats);
    let mut totals = TokenUsage::default();

    for (i, target) in targets.iter().enumerate() {
        println!("\nProcessing notebook {}/{}", i + 1, targets.len());
        println!("Dataset: {}", target.dataset_id());
        println!("Notebook: {}", target.raw());

        let outcome = rate_target(
            client.as_ref(),
            &model,
            target,
            &rubric,
            &policy,
            collection.find(target.raw()),
        )
        .await;

        match outcome {
            Ok((record, usage)) => {
                totals += usage;
                print_summary(&record.scores, record.overall_score);
                collection.upsert(record);
                collection.save(&out)?;
                println!("Rating saved to {}", out.display());
                println!("Total prompt tokens: {}", totals.prompt_tokens);
                println!("Total completion tokens: {}", totals.completion_tokens);
            }
            Err(e) => {
                tracing::error!(notebook = %target.raw(), "rating failed: {e:#}");
            }
        }
    }

    Ok(())
}

async fn rate_target(
    client: &dyn ChatClient,
    model: &str,
    target: &TargetId,
    rubric: &Rubric,
    policy: &ResumePolicy,
    existing: Option<&RatingRecord>,
) -> Result<(RatingRecord, TokenUsage)> {
    let notebook = fetch::load_notebook(target.raw()).await?;
    let metadata = fetch::load_sibling_metadata(target.raw())?;

    let (scores, usage) =
        session::rate_notebook(client, model, &notebook, rubric, policy, existing).await?;
    let record = RatingRecord::new(target, policy.prompt_version(), metadata, scores);
    Ok((record, usage))
}

fn print_summary(scores: &[QuestionResult], overall: f64) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Version", "Score", "Trials"]);

    for result in scores {
        let trials = result
            .trials
            .iter()
            .map(|t| t.score.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&result.name),
            Cell::new(&result.version),
            Cell::new(format!("{:.2}", result.score)),
            Cell::new(trials),
        ]);
    }

    println!("\n{table}");
    println!("Overall score: {overall:.2}");
}
