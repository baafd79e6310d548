//! Evaluation sessions.
//!
//! Three session flavors share one pattern: build a conversation from the
//! notebook content, drive the completion backend, and fold the parsed
//! results into record types. Sessions are pure transformations over their
//! collaborators apart from plot side-file writes; token counts accumulate
//! into a returned [`TokenUsage`], never into global state.

use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::chat::{ChatClient, ChatRequest, Conversation, Message, MessagePart, Role, TokenUsage};
use crate::content::adapt_cell;
use crate::error::FormatError;
use crate::notebook::Notebook;
use crate::prompts;
use crate::records::{PlotRating, PlotRatingRecord, QuestionResult, RatingRecord};
use crate::response::RaterKind;
use crate::resume::{ResumePolicy, WorkState};
use crate::rubric::Rubric;
use crate::sampler::sample_question;

/// Critique a notebook cell by cell.
///
/// One running conversation: each cell's adapted parts are appended as a
/// user turn, the model replies with a critique, and that critique becomes
/// the assistant turn of record — later cells see all earlier critiques.
pub async fn critique_cells(
    client: &dyn ChatClient,
    model: &str,
    notebook: &Notebook,
) -> Result<(Vec<String>, TokenUsage)> {
    let mut conversation = Conversation::with_system(prompts::CELL_CRITIC_SYSTEM_PROMPT);
    let mut critiques = Vec::with_capacity(notebook.cells.len());
    let mut usage = TokenUsage::default();

    for (i, cell) in notebook.cells.iter().enumerate() {
        tracing::info!(cell = i + 1, total = notebook.cells.len(), "critiquing cell");

        let request = ChatRequest {
            model: model.to_string(),
            messages: conversation
                .with(Message::parts(Role::User, adapt_cell(cell)))
                .into_messages(),
        };
        let response = client
            .complete(&request)
            .await
            .with_context(|| format!("critique failed at cell {}", i + 1))?;

        critiques.push(response.text);
        conversation = response.history;
        usage += response.usage;
    }

    Ok((critiques, usage))
}

/// Summarize per-cell critiques into one overall critique.
pub async fn summarize_critiques(
    client: &dyn ChatClient,
    model: &str,
    critiques: &[String],
) -> Result<(String, TokenUsage)> {
    let conversation = Conversation::with_system(prompts::CRITIC_SUMMARY_SYSTEM_PROMPT).with(
        Message::text(Role::User, prompts::summary_user_message(critiques)),
    );
    let request = ChatRequest {
        model: model.to_string(),
        messages: conversation.into_messages(),
    };
    let response = client
        .complete(&request)
        .await
        .context("summary completion failed")?;
    Ok((response.text, response.usage))
}

/// The conversation prefix for notebook rating: rater system prompt followed
/// by one system-role turn per cell, in document order.
pub fn notebook_rating_prefix(notebook: &Notebook) -> Conversation {
    let mut conversation = Conversation::with_system(prompts::NOTEBOOK_RATER_SYSTEM_PROMPT);
    for cell in &notebook.cells {
        conversation = conversation.with(Message::parts(Role::System, adapt_cell(cell)));
    }
    conversation
}

/// Rate a notebook against every rubric question.
///
/// Fresh persisted results are reused verbatim; stale, incomplete, or absent
/// ones are sampled in full.
pub async fn rate_notebook(
    client: &dyn ChatClient,
    model: &str,
    notebook: &Notebook,
    rubric: &Rubric,
    policy: &ResumePolicy,
    existing: Option<&RatingRecord>,
) -> Result<(Vec<QuestionResult>, TokenUsage)> {
    let prefix = notebook_rating_prefix(notebook);
    let mut scores = Vec::with_capacity(rubric.questions.len());
    let mut usage = TokenUsage::default();

    for question in &rubric.questions {
        if let Some(reused) = policy.reusable_question(existing, question) {
            tracing::info!(
                question = %question.name,
                version = %question.version,
                score = reused.score,
                "reusing persisted result"
            );
            scores.push(reused.clone());
            continue;
        }
        if policy.question_state(existing, question) == WorkState::Incomplete {
            tracing::info!(
                question = %question.name,
                version = %question.version,
                "persisted result has a partial trial set, resampling in full"
            );
        }

        let (result, question_usage) = sample_question(
            client,
            model,
            &prefix,
            question,
            RaterKind::Notebook,
            policy.repeats(),
        )
        .await?;
        scores.push(result);
        usage += question_usage;
    }

    Ok((scores, usage))
}

/// Rate every rendered plot in a notebook against every rubric question.
///
/// When `image_dir` is given, each plot's decoded PNG is written once to
/// `<image_dir>/<plot_id>.png`; existing files are left untouched.
pub async fn rate_plots(
    client: &dyn ChatClient,
    model: &str,
    notebook: &Notebook,
    rubric: &Rubric,
    policy: &ResumePolicy,
    existing: Option<&PlotRatingRecord>,
    image_dir: Option<&Path>,
) -> Result<(Vec<PlotRating>, TokenUsage)> {
    let plots = notebook.plots();
    let mut ratings = Vec::with_capacity(plots.len());
    let mut usage = TokenUsage::default();

    for plot in &plots {
        if let Some(dir) = image_dir {
            write_plot_image(dir, &plot.plot_id, &plot.png_base64)?;
        }

        if let Some(reused) = policy.reusable_plot(existing, &plot.plot_id) {
            tracing::info!(plot = %plot.plot_id, "reusing persisted plot ratings");
            ratings.push(reused.clone());
            continue;
        }

        tracing::info!(plot = %plot.plot_id, "rating plot");
        let prefix = Conversation::with_system(prompts::PLOT_RATER_SYSTEM_PROMPT).with(
            Message::parts(
                Role::System,
                vec![MessagePart::png_data_url(&plot.png_base64)],
            ),
        );

        let mut scores = Vec::with_capacity(rubric.questions.len());
        for question in &rubric.questions {
            let (result, question_usage) = sample_question(
                client,
                model,
                &prefix,
                question,
                RaterKind::Plot,
                policy.repeats(),
            )
            .await?;
            scores.push(result);
            usage += question_usage;
        }

        ratings.push(PlotRating {
            plot_id: plot.plot_id.clone(),
            cell_index: plot.cell_index,
            output_index: plot.output_index,
            scores,
        });
    }

    Ok((ratings, usage))
}

/// Write a decoded plot PNG side file, skipping existing files.
fn write_plot_image(dir: &Path, plot_id: &str, png_base64: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create image directory {}", dir.display()))?;
    let path = dir.join(format!("{plot_id}.png"));
    if path.exists() {
        return Ok(());
    }
    let bytes = BASE64.decode(png_base64).map_err(FormatError::from)?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write plot image {}", path.display()))?;
    Ok(())
}
