//! Rubric model: named, versioned questions with scored anchor points.
//!
//! Rubrics load from YAML documents with a top-level `questions` list. A
//! question's `name` plus `version` uniquely identifies its semantics;
//! changing the prompt text requires bumping the version so persisted
//! results are recognized as stale. Validation happens at load time, before
//! any evaluation work begins.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// A loaded rubric: an ordered list of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    pub questions: Vec<Question>,
}

/// One rubric question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Identity key, together with `version`.
    pub name: String,
    /// Identity key, together with `name`. Bumped whenever `question` changes.
    #[serde(deserialize_with = "de_string_or_number")]
    pub version: String,
    /// The prompt text put to the model.
    pub question: String,
    /// Ordered score anchors guiding the model's numeric judgment.
    pub rubric: Vec<RubricAnchor>,
}

/// One (score, description) anchor point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricAnchor {
    pub score: f64,
    pub description: String,
}

/// Accept YAML/JSON versions written as either `"2"` or `2`.
pub(crate) fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Int(n) => Ok(n.to_string()),
        StringOrNumber::Float(_) => Err(de::Error::custom("version must be a string or integer")),
    }
}

impl Question {
    /// Identity key for resume decisions.
    pub fn identity(&self) -> (&str, &str) {
        (&self.name, &self.version)
    }
}

impl Rubric {
    /// Parse and validate a rubric from YAML source.
    pub fn from_yaml_str(source: &str) -> Result<Self, FormatError> {
        let rubric: Rubric =
            serde_yaml::from_str(source).map_err(|e| FormatError::Rubric(e.to_string()))?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Load and validate a rubric file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rubric file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to load rubric: {}", path.display()))
    }

    /// Structural checks beyond field presence.
    ///
    /// Duplicate name+version pairs are a hard error: they would make resume
    /// decisions ambiguous. Cosmetic issues only warn.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.questions.is_empty() {
            return Err(FormatError::Rubric("rubric has no questions".into()));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.identity()) {
                return Err(FormatError::Rubric(format!(
                    "duplicate question identity: {} version {}",
                    question.name, question.version
                )));
            }
            if question.rubric.is_empty() {
                return Err(FormatError::Rubric(format!(
                    "question {} has an empty rubric",
                    question.name
                )));
            }
            if question.question.trim().is_empty() {
                tracing::warn!(name = %question.name, "question text is empty");
            }
        }
        Ok(())
    }
}
