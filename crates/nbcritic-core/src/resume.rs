//! Resume/merge controller.
//!
//! Decides, per unit of work, whether a previously persisted result can be
//! reused or must be recomputed. Units are keyed by target identifier, plus
//! question identity (name, version) for ratings and plot identifier for
//! plot ratings. The merge side is [`crate::records::Collection::upsert`]:
//! recomputed records replace their predecessors wholesale and the whole
//! collection file is rewritten.

use crate::records::{PlotRating, PlotRatingRecord, QuestionResult, RatingRecord, TargetRecord};
use crate::rubric::Question;

/// Classification of one unit of work against persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// No persisted result exists; compute fresh.
    Absent,
    /// Persisted under a different prompt version; recompute, discarding the
    /// old entry at record granularity.
    Stale,
    /// Persisted with a short trial set; resample in full, not topped up.
    Incomplete,
    /// Persisted, complete, current version; reuse verbatim.
    Fresh,
}

/// Resume decisions for one run: the current prompt version and the
/// configured repeat count.
#[derive(Debug, Clone)]
pub struct ResumePolicy {
    prompt_version: String,
    repeats: usize,
}

impl ResumePolicy {
    pub fn new(prompt_version: impl Into<String>, repeats: usize) -> Self {
        ResumePolicy {
            prompt_version: prompt_version.into(),
            repeats,
        }
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Classify a whole record (critique flavor: the unit of work is the
    /// entire notebook).
    pub fn record_state<R: TargetRecord>(&self, existing: Option<&R>) -> WorkState {
        match existing {
            None => WorkState::Absent,
            Some(record) if record.prompt_version() != self.prompt_version => WorkState::Stale,
            Some(_) => WorkState::Fresh,
        }
    }

    /// Classify one question of a rating record.
    pub fn question_state(
        &self,
        existing: Option<&RatingRecord>,
        question: &Question,
    ) -> WorkState {
        let record = match existing {
            None => return WorkState::Absent,
            Some(record) => record,
        };
        if record.prompt_version != self.prompt_version {
            return WorkState::Stale;
        }
        match record.question_result(&question.name, &question.version) {
            None => WorkState::Absent,
            Some(result) if !result.is_complete(self.repeats) => WorkState::Incomplete,
            Some(_) => WorkState::Fresh,
        }
    }

    /// The persisted question result, iff it is Fresh.
    pub fn reusable_question<'a>(
        &self,
        existing: Option<&'a RatingRecord>,
        question: &Question,
    ) -> Option<&'a QuestionResult> {
        match self.question_state(existing, question) {
            WorkState::Fresh => {
                existing?.question_result(&question.name, &question.version)
            }
            _ => None,
        }
    }

    /// Classify one plot of a plot-rating record.
    pub fn plot_state(&self, existing: Option<&PlotRatingRecord>, plot_id: &str) -> WorkState {
        let record = match existing {
            None => return WorkState::Absent,
            Some(record) => record,
        };
        if record.prompt_version != self.prompt_version {
            return WorkState::Stale;
        }
        match record.plot(plot_id) {
            None => WorkState::Absent,
            Some(_) => WorkState::Fresh,
        }
    }

    /// The persisted plot entry, iff it is Fresh.
    pub fn reusable_plot<'a>(
        &self,
        existing: Option<&'a PlotRatingRecord>,
        plot_id: &str,
    ) -> Option<&'a PlotRating> {
        match self.plot_state(existing, plot_id) {
            WorkState::Fresh => existing?.plot(plot_id),
            _ => None,
        }
    }
}
