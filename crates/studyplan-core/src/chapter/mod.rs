//! Chapter records and the five-step reading protocol.

mod payload;
mod state_machine;

pub use payload::{
    ChecklistItem, Highlight, PhasePayload, QuestionEntry, ReciteAttempt, ReviewEntry,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One of the five sequential reading-protocol steps, plus the terminal
/// state.
///
/// Phases follow a strict linear order with no branching and no skipping:
///
/// ```text
/// Survey -> Question -> Read -> Recite -> Review -> Completed
/// ```
///
/// Forward movement happens only through `Chapter::complete_phase`; the only
/// sanctioned backward move is an explicit `Chapter::reopen_phase` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingPhase {
    Survey,
    Question,
    Read,
    Recite,
    Review,
    Completed,
}

impl ReadingPhase {
    /// The five reading phases in execution order (excludes `Completed`).
    pub const ORDER: [ReadingPhase; 5] = [
        ReadingPhase::Survey,
        ReadingPhase::Question,
        ReadingPhase::Read,
        ReadingPhase::Recite,
        ReadingPhase::Review,
    ];

    /// Position in the linear order; `Completed` sorts after every phase.
    pub fn index(&self) -> usize {
        match self {
            ReadingPhase::Survey => 0,
            ReadingPhase::Question => 1,
            ReadingPhase::Read => 2,
            ReadingPhase::Recite => 3,
            ReadingPhase::Review => 4,
            ReadingPhase::Completed => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == ReadingPhase::Completed
    }
}

impl fmt::Display for ReadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadingPhase::Survey => "survey",
            ReadingPhase::Question => "question",
            ReadingPhase::Read => "read",
            ReadingPhase::Recite => "recite",
            ReadingPhase::Review => "review",
            ReadingPhase::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

/// Completion flags for the five reading phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFlags {
    pub survey_done: bool,
    pub question_done: bool,
    pub read_done: bool,
    pub recite_done: bool,
    pub review_done: bool,
}

impl PhaseFlags {
    pub fn is_done(&self, phase: ReadingPhase) -> bool {
        match phase {
            ReadingPhase::Survey => self.survey_done,
            ReadingPhase::Question => self.question_done,
            ReadingPhase::Read => self.read_done,
            ReadingPhase::Recite => self.recite_done,
            ReadingPhase::Review => self.review_done,
            ReadingPhase::Completed => self.all_done(),
        }
    }

    pub(crate) fn set(&mut self, phase: ReadingPhase, done: bool) {
        match phase {
            ReadingPhase::Survey => self.survey_done = done,
            ReadingPhase::Question => self.question_done = done,
            ReadingPhase::Read => self.read_done = done,
            ReadingPhase::Recite => self.recite_done = done,
            ReadingPhase::Review => self.review_done = done,
            ReadingPhase::Completed => {}
        }
    }

    pub fn all_done(&self) -> bool {
        self.survey_done && self.question_done && self.read_done && self.recite_done && self.review_done
    }

    /// The lowest-indexed phase whose flag is still false, or `Completed`
    /// when all five are set.
    pub fn first_unfinished(&self) -> ReadingPhase {
        ReadingPhase::ORDER
            .into_iter()
            .find(|phase| !self.is_done(*phase))
            .unwrap_or(ReadingPhase::Completed)
    }
}

/// Minutes logged per reading phase.
///
/// Totals are absolute: a save overwrites the phase's value rather than
/// accumulating, so repeated saves of the same payload are idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMinutes {
    pub survey: u32,
    pub question: u32,
    pub read: u32,
    pub recite: u32,
    pub review: u32,
}

impl PhaseMinutes {
    pub(crate) fn set(&mut self, phase: ReadingPhase, minutes: u32) {
        match phase {
            ReadingPhase::Survey => self.survey = minutes,
            ReadingPhase::Question => self.question = minutes,
            ReadingPhase::Read => self.read = minutes,
            ReadingPhase::Recite => self.recite = minutes,
            ReadingPhase::Review => self.review = minutes,
            ReadingPhase::Completed => {}
        }
    }

    pub fn total(&self) -> u32 {
        self.survey + self.question + self.read + self.recite + self.review
    }
}

/// A chapter working through the reading protocol.
///
/// `current_phase` is always the lowest-indexed phase whose flag is false,
/// or `Completed` once all five flags are set. The transition operations in
/// `state_machine` are the only code that writes `current_phase` or the
/// flags; everything else treats the record as read-only and persists it
/// with a full-record replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub flags: PhaseFlags,
    pub current_phase: ReadingPhase,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub questions: Vec<QuestionEntry>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub recite_attempts: Vec<ReciteAttempt>,
    #[serde(default)]
    pub review_entries: Vec<ReviewEntry>,
    #[serde(default)]
    pub minutes: PhaseMinutes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    /// Create a fresh chapter: `Survey` phase, no flags set, empty payloads.
    pub fn new(subject_id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id,
            title,
            flags: PhaseFlags::default(),
            current_phase: ReadingPhase::Survey,
            checklist: Vec::new(),
            questions: Vec::new(),
            highlights: Vec::new(),
            recite_attempts: Vec::new(),
            review_entries: Vec::new(),
            minutes: PhaseMinutes::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True iff all five flags are set and the chapter reached `Completed`.
    pub fn completed(&self) -> bool {
        self.current_phase == ReadingPhase::Completed
    }
}

/// A subject grouping related chapters.
///
/// Chapter counts and completion percentages are always derived by the
/// progress aggregator from the chapter records; they are never stored here,
/// so they cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        }
    }
}
