//! The `nbcritic summarize` command.
//!
//! Fills `summary_critique` on already-critiqued records that lack one.
//! Notebooks without a current-version critique record are skipped; run
//! `nbcritic critique` first.

use std::path::PathBuf;

use anyhow::Result;

use nbcritic_core::chat::TokenUsage;
use nbcritic_core::prompts::PROMPT_VERSION;
use nbcritic_core::records::{Collection, CritiqueRecord};
use nbcritic_core::session;
use nbcritic_providers::load_config_from;

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
    let model = model.unwrap_or_else(|| config.models.summary.clone());

    let targets =
        super::resolve_targets(notebooks.as_deref(), notebook.as_deref(), prefix.as_deref())?;
    println!("Found {} notebooks to process", targets.len());

    let mut collection = Collection::<CritiqueRecord>::load(&out)?;
    let mut totals = TokenUsage::default();

    for (i, target) in targets.iter().enumerate() {
        println!("\nProcessing notebook {}/{}", i + 1, targets.len());
        println!("Notebook: {}", target.raw());

        let critiques = match collection.find(target.raw()) {
            None => {
                println!("Notebook not critiqued yet, skipping.");
                continue;
            }
            Some(record) if record.prompt_version != PROMPT_VERSION => {
                println!(
                    "Critique is from prompt version {}, skipping.",
                    record.prompt_version
                );
                continue;
            }
            Some(record) if record.summary_critique.is_some() => {
                println!("Summary already present, skipping.");
                continue;
            }
            Some(record) => record.cell_critiques.clone(),
        };

        match session::summarize_critiques(client.as_ref(), &model, &critiques).await {
            Ok((summary, usage)) => {
                totals += usage;
                if let Some(record) = collection.find_mut(target.raw()) {
                    record.summary_critique = Some(summary);
                }
                collection.save(&out)?;
                println!("Summary saved to {}", out.display());
                println!("Total prompt tokens: {}", totals.prompt_tokens);
                println!("Total completion tokens: {}", totals.completion_tokens);
            }
            Err(e) => {
                tracing::error!(notebook = %target.raw(), "summary failed: {e:#}");
            }
        }
    }

    Ok(())
}
