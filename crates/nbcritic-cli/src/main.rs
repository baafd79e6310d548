//! nbcritic CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod discover;
mod fetch;

#[derive(Parser)]
#[command(
    name = "nbcritic",
    version,
    about = "LLM-based critique and rating of machine-generated analysis notebooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Critique notebooks cell by cell
    Critique {
        /// Directory holding <dataset>/<subfolder>/<dataset>.ipynb trees
        #[arg(long)]
        notebooks: Option<PathBuf>,

        /// A single notebook path or URL
        #[arg(long, conflicts_with = "notebooks")]
        notebook: Option<String>,

        /// Only process subfolders whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Results file
        #[arg(long, default_value = "notebook_critiques.json")]
        out: PathBuf,

        /// Model override (defaults to the configured cells model)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize per-cell critiques into one overall critique per notebook
    Summarize {
        /// Directory holding <dataset>/<subfolder>/<dataset>.ipynb trees
        #[arg(long)]
        notebooks: Option<PathBuf>,

        /// A single notebook path or URL
        #[arg(long, conflicts_with = "notebooks")]
        notebook: Option<String>,

        /// Only process subfolders whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Critique results file to read and update
        #[arg(long, default_value = "notebook_critiques.json")]
        out: PathBuf,

        /// Model override (defaults to the configured summary model)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rate notebooks against a rubric
    Rate {
        /// Directory holding <dataset>/<subfolder>/<dataset>.ipynb trees
        #[arg(long)]
        notebooks: Option<PathBuf>,

        /// A single notebook path or URL
        #[arg(long, conflicts_with = "notebooks")]
        notebook: Option<String>,

        /// Only process subfolders whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Rubric YAML file
        #[arg(long, default_value = "rubric.yml")]
        rubric: PathBuf,

        /// Results file
        #[arg(long, default_value = "ratings.json")]
        out: PathBuf,

        /// Trials sampled per question
        #[arg(long, default_value = "3")]
        repeats: usize,

        /// Model override (defaults to the configured rating model)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rate every rendered plot in each notebook against a rubric
    RatePlots {
        /// Directory holding <dataset>/<subfolder>/<dataset>.ipynb trees
        #[arg(long)]
        notebooks: Option<PathBuf>,

        /// A single notebook path or URL
        #[arg(long, conflicts_with = "notebooks")]
        notebook: Option<String>,

        /// Only process subfolders whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Rubric YAML file
        #[arg(long, default_value = "plot_rubric.yml")]
        rubric: PathBuf,

        /// Results file
        #[arg(long, default_value = "plot_ratings.json")]
        out: PathBuf,

        /// Trials sampled per question
        #[arg(long, default_value = "3")]
        repeats: usize,

        /// Model override (defaults to the configured rating model)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a rubric YAML file
    Validate {
        /// Rubric file path
        #[arg(long)]
        rubric: PathBuf,
    },

    /// Create starter config and example rubrics
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nbcritic=info".parse().unwrap())
                .add_directive("nbcritic_core=info".parse().unwrap())
                .add_directive("nbcritic_providers=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Critique {
            notebooks,
            notebook,
            prefix,
            out,
            model,
            config,
        } => commands::critique::execute(notebooks, notebook, prefix, out, model, config).await,
        Commands::Summarize {
            notebooks,
            notebook,
            prefix,
            out,
            model,
            config,
        } => commands::summarize::execute(notebooks, notebook, prefix, out, model, config).await,
        Commands::Rate {
            notebooks,
            notebook,
            prefix,
            rubric,
            out,
            repeats,
            model,
            config,
        } => {
            commands::rate::execute(
                notebooks, notebook, prefix, rubric, out, repeats, model, config,
            )
            .await
        }
        Commands::RatePlots {
            notebooks,
            notebook,
            prefix,
            rubric,
            out,
            repeats,
            model,
            config,
        } => {
            commands::rate_plots::execute(
                notebooks, notebook, prefix, rubric, out, repeats, model, config,
            )
            .await
        }
        Commands::Validate { rubric } => commands::validate::execute(rubric),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
