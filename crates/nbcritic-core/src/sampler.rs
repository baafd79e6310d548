//! Repeated sampling and aggregation for one rubric question.
//!
//! A question is put to the model `repeats` times as independent sequential
//! trials; each trial parses into (score, reasoning) and the aggregate score
//! is the plain arithmetic mean. A parse or transport failure on any trial
//! is fatal to the whole sampling call — partial trial sets are never
//! silently averaged.

use anyhow::{Context, Result};

use crate::chat::{ChatClient, ChatRequest, Conversation, Message, Role, TokenUsage};
use crate::prompts::rating_question_message;
use crate::records::{QuestionResult, Trial};
use crate::response::{parse_rater_response, RaterKind};
use crate::rubric::Question;

/// Trials sampled per question.
pub const DEFAULT_REPEATS: usize = 3;

/// Sample one question `repeats` times against a fixed conversation prefix.
pub async fn sample_question(
    client: &dyn ChatClient,
    model: &str,
    prefix: &Conversation,
    question: &Question,
    kind: RaterKind,
    repeats: usize,
) -> Result<(QuestionResult, TokenUsage)> {
    let mut trials = Vec::with_capacity(repeats);
    let mut usage = TokenUsage::default();

    for repnum in 0..repeats {
        tracing::info!(
            question = %question.name,
            version = %question.version,
            repetition = repnum + 1,
            total = repeats,
            "sampling question"
        );

        let conversation = prefix
            .clone()
            .with(Message::text(Role::User, rating_question_message(question, kind)));
        let request = ChatRequest {
            model: model.to_string(),
            messages: conversation.into_messages(),
        };

        let response = client.complete(&request).await.with_context(|| {
            format!(
                "completion failed for question {} v{} repetition {repnum}",
                question.name, question.version
            )
        })?;
        usage += response.usage;

        let review = parse_rater_response(&response.text, kind).with_context(|| {
            format!(
                "malformed response for question {} v{} repetition {repnum}",
                question.name, question.version
            )
        })?;

        trials.push(Trial {
            score: review.score,
            thinking: review.thinking,
            repnum,
        });
    }

    let result = QuestionResult::from_trials(&question.name, &question.version, trials);
    tracing::info!(
        question = %question.name,
        score = result.score,
        "question sampled"
    );
    Ok((result, usage))
}
