//! The `nbcritic critique` command.

use std::path::PathBuf;

use anyhow::Result;

use nbcritic_core::chat::{ChatClient, TokenUsage};
use nbcritic_core::prompts::PROMPT_VERSION;
use nbcritic_core::records::{Collection, CritiqueRecord};
use nbcritic_core::resume::{ResumePolicy, WorkState};
use nbcritic_core::sampler::DEFAULT_REPEATS;
use nbcritic_core::session;
use nbcritic_core::target::TargetId;
use nbcritic_providers::load_config_from;

use crate::fetch;

pub async fn execute(
    notebooks: Option<PathBuf>,
    notebook: Option<String>,
    prefix: Option<String>,
    out: PathBuf,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let client = super::client_from_config(&config)?;
    let model = model.unwrap_or_else(|| config.models.cells.clone());

    let targets =
        super::resolve_targets(notebooks.as_deref(), notebook.as_deref(), prefix.as_deref())?;
    println!("Found {} notebooks to process", targets.len());

    let mut collection = Collection::<CritiqueRecord>::load(&out)?;
    let policy = ResumePolicy::new(PROMPT_VERSION, DEFAULT_REPEATS);
    let mut totals = TokenUsage::default();

    for (i, target) in targets.iter().enumerate() {
        println!("\nProcessing notebook {}/{}", i + 1, targets.len());
        println!("Dataset: {}", target.dataset_id());
        println!("Notebook: {}", target.raw());

        if policy.record_state(collection.find(target.raw())) == WorkState::Fresh {
            println!("Notebook already critiqued, skipping.");
            continue;
        }

        match critique_target(client.as_ref(), &model, target).await {
            Ok((record, usage)) => {
                totals += usage;
                collection.upsert(record);
                collection.save(&out)?;
                println!("Critiques saved to {}", out.display());
                println!("Total prompt tokens: {}", totals.prompt_tokens);
                println!("Total completion tokens: {}", totals.completion_tokens);
            }
            Err(e) => {
                tracing::error!(notebook = %target.raw(), "critique failed: {e:#}");
            }
        }
    }

    Ok(())
}

async fn critique_target(
    client: &dyn ChatClient,
    model: &str,
    target: &TargetId,
) -> Result<(CritiqueRecord, TokenUsage)> {
    let notebook = fetch::load_notebook(target.raw()).await?;
    let metadata = fetch::load_sibling_metadata(target.raw())?;

    let (critiques, usage) = session::critique_cells(client, model, &notebook).await?;
    let record = CritiqueRecord::new(target, PROMPT_VERSION, metadata, critiques);
    Ok((record, usage))
}
