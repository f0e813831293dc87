//! Phase-scoped payload types.
//!
//! Each reading phase persists its own working data against the chapter:
//! the survey checklist, the question list, reading highlights, recitation
//! attempts, and review notes. A payload always carries the complete data
//! for its phase -- applying one replaces the stored list wholesale, the
//! same full-record-replace rule the persistence boundary follows.

use serde::{Deserialize, Serialize};

use super::ReadingPhase;

/// A single survey checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub checked: bool,
}

/// A question raised while questioning, answered while reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionEntry {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
}

impl QuestionEntry {
    /// Whether the entry carries a non-blank answer.
    pub fn answered(&self) -> bool {
        matches!(&self.answer, Some(answer) if !answer.trim().is_empty())
    }
}

/// A passage marked while reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Free-form locator, e.g. a page or section reference.
    #[serde(default)]
    pub location: Option<String>,
    pub text: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// One recitation attempt against a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReciteAttempt {
    pub prompt: String,
    pub recalled: bool,
}

/// A note taken during final review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub note: String,
}

/// Data saved against a chapter's current phase.
///
/// `minutes_spent` is the total time logged for the phase so far, not a
/// delta: saving the same payload twice leaves the chapter exactly as one
/// save does, which is what lets callers coalesce or repeat saves freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum PhasePayload {
    Survey {
        checklist: Vec<ChecklistItem>,
        #[serde(default)]
        minutes_spent: u32,
    },
    Question {
        questions: Vec<QuestionEntry>,
        #[serde(default)]
        minutes_spent: u32,
    },
    Read {
        highlights: Vec<Highlight>,
        /// The question list with answers filled in; replaces the stored
        /// list from the questioning phase.
        answers: Vec<QuestionEntry>,
        #[serde(default)]
        minutes_spent: u32,
    },
    Recite {
        attempts: Vec<ReciteAttempt>,
        #[serde(default)]
        minutes_spent: u32,
    },
    Review {
        entries: Vec<ReviewEntry>,
        #[serde(default)]
        minutes_spent: u32,
    },
}

impl PhasePayload {
    /// The phase this payload belongs to.
    pub fn phase(&self) -> ReadingPhase {
        match self {
            PhasePayload::Survey { .. } => ReadingPhase::Survey,
            PhasePayload::Question { .. } => ReadingPhase::Question,
            PhasePayload::Read { .. } => ReadingPhase::Read,
            PhasePayload::Recite { .. } => ReadingPhase::Recite,
            PhasePayload::Review { .. } => ReadingPhase::Review,
        }
    }
}
