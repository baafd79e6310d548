//! Built-in system prompts and user-message builders.
//!
//! `PROMPT_VERSION` tags every persisted record; bump it whenever any prompt
//! below changes so the resume controller recomputes old results.

use crate::response::RaterKind;
use crate::rubric::Question;

/// Version tag written into every persisted record.
pub const PROMPT_VERSION: &str = "1";

/// System prompt for the per-cell critique session.
pub const CELL_CRITIC_SYSTEM_PROMPT: &str = "\
You are a critic reviewing a machine-generated data analysis notebook. The \
user will show you the notebook one cell at a time, in order. Cell content is \
labeled: INPUT-MARKDOWN is markdown source, INPUT-CODE is code source, \
OUTPUT-TEXT and OUTPUT-HTML are execution outputs, and plot images are \
attached directly.

After each cell, respond with a concise critique of that cell in the context \
of the notebook so far: whether the text is accurate and informative, whether \
the code is correct and appropriate, and whether the outputs support the \
narrative. Point out errors, misleading statements, and empty or broken \
outputs. Do not summarize the whole notebook until asked.";

/// System prompt for the critique summary session.
pub const CRITIC_SUMMARY_SYSTEM_PROMPT: &str = "\
You are a critic reviewing a machine-generated data analysis notebook. You \
previously critiqued the notebook cell by cell, and the user will now give \
you the full list of per-cell critiques. Summarize them into a single \
overall critique of the notebook: the main strengths, the main problems, and \
whether the notebook accomplishes what it sets out to do. Be concise and \
concrete.";

/// System prompt for the notebook rating session.
pub const NOTEBOOK_RATER_SYSTEM_PROMPT: &str = "\
You are a rater judging the quality of a machine-generated data analysis \
notebook. The notebook content will be provided cell by cell. Cell content \
is labeled: INPUT-MARKDOWN is markdown source, INPUT-CODE is code source, \
OUTPUT-TEXT and OUTPUT-HTML are execution outputs, and plot images are \
attached directly.

You will then be asked to rate the notebook based on a question with a \
scoring rubric. Pick the rubric entry that best matches the notebook and \
answer with its numeric score. Your output must be exactly in the following \
format:

<notebook_rater>
    <thinking>Your reasoning for the score</thinking>
    <score>numeric_score</score>
</notebook_rater>";

/// System prompt for the plot rating session.
pub const PLOT_RATER_SYSTEM_PROMPT: &str = "\
You are a rater judging the quality of a single plot taken from a \
machine-generated data analysis notebook. The plot image is attached.

You will be asked to rate the plot based on a question with a scoring \
rubric. Pick the rubric entry that best matches the plot and answer with its \
numeric score. Your output must be exactly in the following format:

<plot_rater>
    <thinking>Your reasoning for the score</thinking>
    <score>numeric_score</score>
</plot_rater>";

/// The fixed instruction block restating the expected tag envelope.
pub fn rating_instruction(kind: RaterKind) -> String {
    let tag = kind.outer_tag();
    format!(
        "\nRemember that your output should be in the following format:\n\n\
         <{tag}>\n    <thinking>Your reasoning for the score</thinking>\n    \
         <score>numeric_score</score>\n</{tag}>\n"
    )
}

/// The user turn putting one rubric question to the rater.
pub fn rating_question_message(question: &Question, kind: RaterKind) -> String {
    let mut message = format!(
        "Please rate the {} based on the following question: {}\n\nRubric:\n",
        kind.target_noun(),
        question.question
    );
    for anchor in &question.rubric {
        message.push_str(&format!("- {}: {}\n", anchor.score, anchor.description));
    }
    message.push_str(&rating_instruction(kind));
    message
}

/// The user turn listing per-cell critiques for the summary session.
pub fn summary_user_message(critiques: &[String]) -> String {
    let mut message = String::from("Here are the cell critiques for the notebook:\n\n");
    for (i, critique) in critiques.iter().enumerate() {
        message.push_str(&format!("Cell {}:\n\n{critique}\n\n", i + 1));
    }
    message.push_str("Please summarize the critiques as you were instructed.\n\n");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::RubricAnchor;

    #[test]
    fn question_message_renders_rubric_lines() {
        let question = Question {
            name: "clarity".into(),
            version: "1".into(),
            question: "How clear is the notebook?".into(),
            rubric: vec![
                RubricAnchor {
                    score: 1.0,
                    description: "bad".into(),
                },
                RubricAnchor {
                    score: 5.0,
                    description: "good".into(),
                },
            ],
        };
        let message = rating_question_message(&question, RaterKind::Notebook);
        assert!(message.starts_with(
            "Please rate the notebook based on the following question: How clear is the notebook?"
        ));
        assert!(message.contains("- 1: bad\n"));
        assert!(message.contains("- 5: good\n"));
        assert!(message.contains("<notebook_rater>"));
    }

    #[test]
    fn plot_message_uses_plot_vocabulary() {
        let question = Question {
            name: "q".into(),
            version: "1".into(),
            question: "Readable?".into(),
            rubric: vec![RubricAnchor {
                score: 1.0,
                description: "no".into(),
            }],
        };
        let message = rating_question_message(&question, RaterKind::Plot);
        assert!(message.contains("rate the plot"));
        assert!(message.contains("<plot_rater>"));
        assert!(!message.contains("<notebook_rater>"));
    }

    #[test]
    fn summary_message_numbers_cells_from_one() {
        let message = summary_user_message(&["first".into(), "second".into()]);
        assert!(message.contains("Cell 1:\n\nfirst\n\n"));
        assert!(message.contains("Cell 2:\n\nsecond\n\n"));
    }

    #[test]
    fn rater_prompts_state_the_envelope() {
        assert!(NOTEBOOK_RATER_SYSTEM_PROMPT.contains("<notebook_rater>"));
        assert!(NOTEBOOK_RATER_SYSTEM_PROMPT.contains("<score>"));
        assert!(PLOT_RATER_SYSTEM_PROMPT.contains("<plot_rater>"));
    }
}
