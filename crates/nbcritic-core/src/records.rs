//! Persisted evaluation records and their on-disk collections.
//!
//! Each evaluation flavor persists one JSON array file of records, sorted by
//! target identifier. The whole collection is read into memory, mutated via
//! [`Collection::upsert`], and rewritten in full after every successfully
//! completed target — bounding data loss to at most one in-flight target.
//!
//! Field names follow the established wire format (`reps`, `repnum`, ...) so
//! existing result viewers keep working.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rubric::de_string_or_number;
use crate::target::TargetId;

/// One sampled model response to a rubric question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub score: f64,
    pub thinking: String,
    /// 0-based repetition index.
    pub repnum: usize,
}

/// Aggregate over a fixed number of trials for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub name: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub version: String,
    /// Arithmetic mean of the trial scores.
    pub score: f64,
    /// Full trial list, preserved for audit.
    #[serde(rename = "reps")]
    pub trials: Vec<Trial>,
}

impl QuestionResult {
    /// Aggregate trials into a result; equal weight per trial.
    pub fn from_trials(
        name: impl Into<String>,
        version: impl Into<String>,
        trials: Vec<Trial>,
    ) -> Self {
        let score = if trials.is_empty() {
            0.0
        } else {
            trials.iter().map(|t| t.score).sum::<f64>() / trials.len() as f64
        };
        QuestionResult {
            name: name.into(),
            version: version.into(),
            score,
            trials,
        }
    }

    /// A result is reusable only with a full trial set; partial sets are
    /// redone in full, never topped up.
    pub fn is_complete(&self, repeats: usize) -> bool {
        self.trials.len() == repeats
    }
}

/// Persisted per-cell critique results for one notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueRecord {
    pub notebook: String,
    pub dataset_id: String,
    pub subfolder: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub prompt_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub cell_critiques: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_critique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl CritiqueRecord {
    pub fn new(
        target: &TargetId,
        prompt_version: impl Into<String>,
        metadata: Option<Value>,
        cell_critiques: Vec<String>,
    ) -> Self {
        CritiqueRecord {
            notebook: target.raw().to_string(),
            dataset_id: target.dataset_id().to_string(),
            subfolder: target.subfolder().to_string(),
            prompt_version: prompt_version.into(),
            metadata,
            cell_critiques,
            summary_critique: None,
            generated_at: Some(Utc::now()),
        }
    }
}

/// Persisted rubric ratings for one notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub notebook: String,
    pub dataset_id: String,
    pub subfolder: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub prompt_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Sum of the per-question mean scores.
    pub overall_score: f64,
    pub scores: Vec<QuestionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl RatingRecord {
    pub fn new(
        target: &TargetId,
        prompt_version: impl Into<String>,
        metadata: Option<Value>,
        scores: Vec<QuestionResult>,
    ) -> Self {
        RatingRecord {
            notebook: target.raw().to_string(),
            dataset_id: target.dataset_id().to_string(),
            subfolder: target.subfolder().to_string(),
            prompt_version: prompt_version.into(),
            metadata,
            overall_score: overall_score(&scores),
            scores,
            generated_at: Some(Utc::now()),
        }
    }

    /// The question result matching a name+version identity, if any.
    pub fn question_result(&self, name: &str, version: &str) -> Option<&QuestionResult> {
        self.scores
            .iter()
            .find(|s| s.name == name && s.version == version)
    }
}

/// Sum of per-question mean scores.
pub fn overall_score(scores: &[QuestionResult]) -> f64 {
    scores.iter().map(|s| s.score).sum()
}

/// Ratings for one rendered plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRating {
    pub plot_id: String,
    pub cell_index: usize,
    pub output_index: usize,
    pub scores: Vec<QuestionResult>,
}

/// Persisted plot ratings for one notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRatingRecord {
    pub notebook: String,
    pub dataset_id: String,
    pub subfolder: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub prompt_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub plots: Vec<PlotRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl PlotRatingRecord {
    pub fn new(
        target: &TargetId,
        prompt_version: impl Into<String>,
        metadata: Option<Value>,
        plots: Vec<PlotRating>,
    ) -> Self {
        PlotRatingRecord {
            notebook: target.raw().to_string(),
            dataset_id: target.dataset_id().to_string(),
            subfolder: target.subfolder().to_string(),
            prompt_version: prompt_version.into(),
            metadata,
            plots,
            generated_at: Some(Utc::now()),
        }
    }

    pub fn plot(&self, plot_id: &str) -> Option<&PlotRating> {
        self.plots.iter().find(|p| p.plot_id == plot_id)
    }
}

/// A persisted record keyed by target identifier.
pub trait TargetRecord {
    fn target(&self) -> &str;
    fn prompt_version(&self) -> &str;
}

macro_rules! impl_target_record {
    ($($ty:ty),*) => {
        $(impl TargetRecord for $ty {
            fn target(&self) -> &str {
                &self.notebook
            }
            fn prompt_version(&self) -> &str {
                &self.prompt_version
            }
        })*
    };
}

impl_target_record!(CritiqueRecord, RatingRecord, PlotRatingRecord);

/// An ordered-by-target list of records; the unit of persistence.
#[derive(Debug, Clone)]
pub struct Collection<R> {
    records: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Collection {
            records: Vec::new(),
        }
    }
}

impl<R: TargetRecord> Collection<R> {
    pub fn find(&self, target: &str) -> Option<&R> {
        self.records.iter().find(|r| r.target() == target)
    }

    pub fn find_mut(&mut self, target: &str) -> Option<&mut R> {
        self.records.iter_mut().find(|r| r.target() == target)
    }

    /// Replace any record for the same target and keep the collection sorted
    /// by target identifier. Records are replaced wholesale, never patched.
    pub fn upsert(&mut self, record: R) {
        self.records.retain(|r| r.target() != record.target());
        self.records.push(record);
        self.records.sort_by(|a, b| a.target().cmp(b.target()));
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: TargetRecord + DeserializeOwned> Collection<R> {
    /// Read a collection file; a missing file is an empty collection.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results file: {}", path.display()))?;
        let records: Vec<R> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse results file: {}", path.display()))?;
        Ok(Collection { records })
    }
}

impl<R: TargetRecord + Serialize> Collection<R> {
    /// Rewrite the whole collection file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.records).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(score: f64, repnum: usize) -> Trial {
        Trial {
            score,
            thinking: format!("trial {repnum}"),
            repnum,
        }
    }

    fn record(notebook: &str) -> RatingRecord {
        let target = TargetId::parse(format!("data/{notebook}/a/{notebook}.ipynb")).unwrap();
        RatingRecord::new(&target, "1", None, vec![])
    }

    #[test]
    fn mean_score_over_trials() {
        let result = QuestionResult::from_trials(
            "clarity",
            "1",
            vec![trial(1.0, 0), trial(2.0, 1), trial(3.0, 2)],
        );
        assert_eq!(result.score, 2.0);
        let indices: Vec<usize> = result.trials.iter().map(|t| t.repnum).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn completeness_requires_exact_trial_count() {
        let result = QuestionResult::from_trials("q", "1", vec![trial(1.0, 0), trial(2.0, 1)]);
        assert!(result.is_complete(2));
        assert!(!result.is_complete(3));
    }

    #[test]
    fn overall_score_is_sum_of_means() {
        let scores = vec![
            QuestionResult::from_trials("a", "1", vec![trial(2.0, 0)]),
            QuestionResult::from_trials("b", "1", vec![trial(3.5, 0)]),
        ];
        assert_eq!(overall_score(&scores), 5.5);
    }

    #[test]
    fn trials_serialize_as_reps() {
        let result = QuestionResult::from_trials("q", "1", vec![trial(4.0, 0)]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("reps").is_some());
        assert!(json.get("trials").is_none());

        let back: QuestionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn numeric_versions_deserialize() {
        let json = serde_json::json!({
            "name": "q", "version": 2, "score": 1.0,
            "reps": [{"score": 1.0, "thinking": "t", "repnum": 0}]
        });
        let result: QuestionResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.version, "2");
    }

    #[test]
    fn upsert_replaces_and_sorts() {
        let mut collection = Collection::default();
        collection.upsert(record("b"));
        collection.upsert(record("a"));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.records()[0].dataset_id, "a");

        // replacing keeps one record per target
        let mut replacement = record("b");
        replacement.overall_score = 9.0;
        collection.upsert(replacement);
        assert_eq!(collection.len(), 2);
        let b = collection.find("data/b/a/b.ipynb").unwrap();
        assert_eq!(b.overall_score, 9.0);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collection: Collection<RatingRecord> =
            Collection::load(&dir.path().join("none.json")).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");

        let mut collection = Collection::default();
        collection.upsert(record("x"));
        collection.save(&path).unwrap();

        let loaded: Collection<RatingRecord> = Collection::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].dataset_id, "x");
    }

    #[test]
    fn record_carries_target_identity() {
        let target = TargetId::parse("data/000123/run/000123.ipynb").unwrap();
        let rec = CritiqueRecord::new(&target, "1", None, vec!["fine".into()]);
        assert_eq!(rec.target(), "data/000123/run/000123.ipynb");
        assert_eq!(rec.dataset_id, "000123");
        assert_eq!(rec.subfolder, "run");
        assert_eq!(rec.prompt_version(), "1");
        assert!(rec.summary_critique.is_none());
    }
}
