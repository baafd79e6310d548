//! The `nbcritic rate-plots` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use nbcritic_core::chat::{ChatClient, TokenUsage};
use nbcritic_core::prompts::PROMPT_VERSION;
use nbcritic_core::records::{Collection, PlotRatingRecord};
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

    let mut collection = Collection::<PlotRatingRecord>::load(&out)?;
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
                print_summary(&record);
                collection.upsert(record);
                collection.save(&out)?;
                println!("Plot ratings saved to {}", out.display());
                println!("Total prompt tokens: {}", totals.prompt_tokens);
                println!("Total completion tokens: {}", totals.completion_tokens);
            }
            Err(e) => {
                tracing::error!(notebook = %target.raw(), "plot rating failed: {e:#}");
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
    existing: Option<&PlotRatingRecord>,
) -> Result<(PlotRatingRecord, TokenUsage)> {
    let notebook = fetch::load_notebook(target.raw()).await?;
    let metadata = fetch::load_sibling_metadata(target.raw())?;

    // Decoded plot PNGs are written next to local notebooks; remote targets
    // get no side files.
    let image_dir = if fetch::is_url(target.raw()) {
        None
    } else {
        Path::new(target.raw()).parent().map(|p| p.join("plot_images"))
    };

    let (plots, usage) = session::rate_plots(
        client,
        model,
        &notebook,
        rubric,
        policy,
        existing,
        image_dir.as_deref(),
    )
    .await?;
    let record = PlotRatingRecord::new(target, policy.prompt_version(), metadata, plots);
    Ok((record, usage))
}

fn print_summary(record: &PlotRatingRecord) {
    println!("\nProcessed {} plots in {}", record.plots.len(), record.notebook);
    for plot in &record.plots {
        println!("\nPlot {}:", plot.plot_id);
        for score in &plot.scores {
            println!("{}: {:.2}", score.name, score.score);
        }
    }
}
