//! Model response parsing.
//!
//! Raters are instructed to answer inside a fixed tag envelope:
//!
//! ```text
//! <notebook_rater>
//!     <thinking>...</thinking>
//!     <score>4</score>
//! </notebook_rater>
//! ```
//!
//! The parser is a narrowly scoped grammar, not an XML parser: the outer tag
//! pair is located by first occurrence, then `<thinking>` and `<score>`
//! inside the enclosed span, again by first occurrence. Nested or repeated
//! tags are unsupported; the first occurrence wins. Anything outside the
//! envelope (preamble, trailing chatter) is ignored.

use crate::error::FormatError;

/// Which rater emitted the response; selects the outer tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaterKind {
    Notebook,
    Plot,
}

impl RaterKind {
    pub fn outer_tag(&self) -> &'static str {
        match self {
            RaterKind::Notebook => "notebook_rater",
            RaterKind::Plot => "plot_rater",
        }
    }

    /// What the rater is judging, for prompt text.
    pub fn target_noun(&self) -> &'static str {
        match self {
            RaterKind::Notebook => "notebook",
            RaterKind::Plot => "plot",
        }
    }
}

/// A parsed rater response: reasoning trace plus numeric score.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReview {
    pub thinking: String,
    pub score: f64,
}

/// Extract reasoning and score from a tagged rater response.
///
/// Fails with a [`FormatError`] if any tag pair is absent or the score is
/// not numeric; a malformed response is fatal to the current trial, never
/// silently defaulted.
pub fn parse_rater_response(text: &str, kind: RaterKind) -> Result<ParsedReview, FormatError> {
    let body = enclosed(text, kind.outer_tag()).ok_or(FormatError::MissingTag {
        tag: kind.outer_tag(),
    })?;

    let thinking = enclosed(body, "thinking")
        .ok_or(FormatError::MissingTag { tag: "thinking" })?
        .trim()
        .to_string();

    let raw_score = enclosed(body, "score")
        .ok_or(FormatError::MissingTag { tag: "score" })?
        .trim();
    let score = raw_score.parse::<f64>().map_err(|_| FormatError::InvalidScore {
        raw: raw_score.to_string(),
    })?;

    Ok(ParsedReview { thinking, score })
}

/// Render a review back into the tag envelope (prompt examples and tests).
pub fn format_rater_response(review: &ParsedReview, kind: RaterKind) -> String {
    let tag = kind.outer_tag();
    format!(
        "<{tag}>\n    <thinking>{}</thinking>\n    <score>{}</score>\n</{tag}>",
        review.thinking, review.score
    )
}

/// The span between the first `<tag>` and the first `</tag>` after it.
fn enclosed<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    Some(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_well_formed_response() {
        let text = "Sure, here is my rating:\n<notebook_rater>\n  <thinking>solid work</thinking>\n  <score>4.5</score>\n</notebook_rater>\nthanks!";
        let review = parse_rater_response(text, RaterKind::Notebook).unwrap();
        assert_eq!(review.thinking, "solid work");
        assert_eq!(review.score, 4.5);
    }

    #[test]
    fn format_parse_round_trip() {
        for &(thinking, score) in &[
            ("ok", 5.0),
            ("needs work", -1.5),
            ("fraction", 0.3333),
            ("zero", 0.0),
        ] {
            for &kind in &[RaterKind::Notebook, RaterKind::Plot] {
                let review = ParsedReview {
                    thinking: thinking.into(),
                    score,
                };
                let parsed =
                    parse_rater_response(&format_rater_response(&review, kind), kind).unwrap();
                assert_eq!(parsed, review);
            }
        }
    }

    #[test]
    fn plot_tag_is_not_accepted_for_notebook() {
        let text = "<plot_rater><thinking>x</thinking><score>1</score></plot_rater>";
        let err = parse_rater_response(text, RaterKind::Notebook).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingTag {
                tag: "notebook_rater"
            }
        ));
        assert!(parse_rater_response(text, RaterKind::Plot).is_ok());
    }

    #[test]
    fn missing_outer_tag_fails() {
        let err = parse_rater_response("no tags here", RaterKind::Notebook).unwrap_err();
        assert!(matches!(err, FormatError::MissingTag { .. }));
    }

    #[test]
    fn missing_thinking_fails() {
        let text = "<notebook_rater><score>3</score></notebook_rater>";
        let err = parse_rater_response(text, RaterKind::Notebook).unwrap_err();
        assert!(matches!(err, FormatError::MissingTag { tag: "thinking" }));
    }

    #[test]
    fn non_numeric_score_fails() {
        let text = "<notebook_rater><thinking>x</thinking><score>N/A</score></notebook_rater>";
        let err = parse_rater_response(text, RaterKind::Notebook).unwrap_err();
        match err {
            FormatError::InvalidScore { raw } => assert_eq!(raw, "N/A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_occurrence_wins_on_repeated_tags() {
        let text = "<notebook_rater><thinking>first</thinking><score>1</score>\
                    <thinking>second</thinking><score>2</score></notebook_rater>";
        let review = parse_rater_response(text, RaterKind::Notebook).unwrap();
        assert_eq!(review.thinking, "first");
        assert_eq!(review.score, 1.0);
    }

    #[test]
    fn negative_and_integer_scores_parse() {
        let text = "<plot_rater><thinking>t</thinking><score>-2</score></plot_rater>";
        let review = parse_rater_response(text, RaterKind::Plot).unwrap();
        assert_eq!(review.score, -2.0);
    }
}
