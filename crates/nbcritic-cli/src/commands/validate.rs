//! The `nbcritic validate` command.

use std::path::PathBuf;

use anyhow::Result;

use nbcritic_core::rubric::Rubric;

pub fn execute(rubric_path: PathBuf) -> Result<()> {
    let rubric = Rubric::load(&rubric_path)?;

    println!(
        "Rubric: {} ({} questions)",
        rubric_path.display(),
        rubric.questions.len()
    );
    for question in &rubric.questions {
        println!(
            "  {} v{}: {} anchor(s)",
            question.name,
            question.version,
            question.rubric.len()
        );
    }
    println!("Rubric valid.");

    Ok(())
}
