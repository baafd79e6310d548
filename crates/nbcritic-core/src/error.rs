//! Structural error types.
//!
//! `FormatError` covers malformed inputs the core must reject explicitly:
//! notebooks without cells, invalid rubric documents, and model responses
//! that do not follow the expected tag envelope. These are fatal to the
//! current unit of work and are never silently defaulted.

use thiserror::Error;

/// A structural failure in one of the documents the core consumes.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The notebook document is not valid JSON.
    #[error("invalid notebook JSON: {0}")]
    Notebook(String),

    /// The notebook document has no `cells` array.
    #[error("invalid notebook format: no cells found")]
    MissingCells,

    /// The rubric document is malformed or fails validation.
    #[error("invalid rubric: {0}")]
    Rubric(String),

    /// The model response is missing a required tag pair.
    #[error("model response is missing a <{tag}> section")]
    MissingTag { tag: &'static str },

    /// The `<score>` content could not be parsed as a number.
    #[error("model response score is not numeric: {raw:?}")]
    InvalidScore { raw: String },

    /// An embedded image payload is not valid base64.
    #[error("invalid base64 image payload: {0}")]
    ImagePayload(#[from] base64::DecodeError),

    /// A target path/URL is too shallow to carry dataset id and subfolder.
    #[error("cannot derive dataset id and subfolder from {0:?}")]
    TargetPath(String),
}
