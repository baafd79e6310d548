//! The `nbcritic init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create nbcritic.toml
    if std::path::Path::new("nbcritic.toml").exists() {
        println!("nbcritic.toml already exists, skipping.");
    } else {
        std::fs::write("nbcritic.toml", SAMPLE_CONFIG)?;
        println!("Created nbcritic.toml");
    }

    // Create example rubrics
    for (path, content) in [
        ("rubric.yml", EXAMPLE_RUBRIC),
        ("plot_rubric.yml", EXAMPLE_PLOT_RUBRIC),
    ] {
        if std::path::Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content)?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit nbcritic.toml with your API key");
    println!("  2. Run: nbcritic validate --rubric rubric.yml");
    println!("  3. Run: nbcritic critique --notebooks <dir>");
    println!("  4. Run: nbcritic rate --notebooks <dir>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nbcritic configuration

default_provider = "openrouter"

[providers.openrouter]
type = "openrouter"
api_key = "${OPENROUTER_API_KEY}"

[models]
cells = "google/gemini-2.0-flash-001"
summary = "anthropic/claude-3.7-sonnet"
rating = "google/gemini-2.0-flash-001"
"#;

const EXAMPLE_RUBRIC: &str = r#"questions:
  - name: narrative-quality
    version: "1"
    question: >
      How well does the notebook's text explain what is being done and why,
      and does it accurately describe the outputs?
    rubric:
      - score: 1
        description: Text is missing, wrong, or contradicts the outputs.
      - score: 3
        description: Text is mostly accurate but thin or generic.
      - score: 5
        description: Text is accurate, specific, and guides the reader through the analysis.

  - name: code-correctness
    version: "1"
    question: >
      Does the code run the analysis it claims to, without errors or
      misleading shortcuts?
    rubric:
      - score: 1
        description: Code errors out or does something different from the narrative.
      - score: 3
        description: Code works but has questionable choices or dead ends.
      - score: 5
        description: Code is correct and matches the narrative.
"#;

const EXAMPLE_PLOT_RUBRIC: &str = r#"questions:
  - name: plot-readability
    version: "1"
    question: >
      Is the plot readable: labeled axes, sensible scales, legible legend?
    rubric:
      - score: 1
        description: Unreadable or unlabeled.
      - score: 3
        description: Readable with minor issues.
      - score: 5
        description: Clear, fully labeled, publication quality.

  - name: plot-informativeness
    version: "1"
    question: >
      Does the plot show meaningful structure in the data rather than an
      empty or degenerate view?
    rubric:
      - score: 1
        description: Empty, constant, or degenerate.
      - score: 3
        description: Shows data but little insight.
      - score: 5
        description: Clearly reveals meaningful structure.
"#;
