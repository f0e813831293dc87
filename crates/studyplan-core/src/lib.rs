//! # Studyplan Core Library
//!
//! This library provides the core business logic for Studyplan: exam
//! metadata goes in, a phased preparation calendar and reading-protocol
//! progress come out. All operations are available via a standalone CLI
//! binary; any GUI is a thin layer over this same core library.
//!
//! ## Architecture
//!
//! - **Calendar Allocator**: pure split of a bounded preparation window
//!   across four weighted phases, with an exact-sum remainder rule
//! - **Chapter State Machine**: forward-only five-step reading protocol
//!   (Survey, Question, Read, Recite, Review) with guarded transitions
//! - **Progress Aggregation**: completion roll-ups recomputed from chapter
//!   snapshots on every call
//! - **Storage**: SQLite record store with full-record replace writes and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CalendarAllocator`]: plan computation
//! - [`Chapter`]: reading-protocol state and its transition operations
//! - [`StudyPlanService`]: allocation + persistence orchestration
//! - [`Database`]: record storage

pub mod plan;
pub mod chapter;
pub mod progress;
pub mod storage;
pub mod error;

pub use plan::{
    CalendarAllocator, ExamMetadata, PhaseName, PhaseWeights, PlanEdit, PlanPhase, StudyPlan,
    StudyPlanService, PHASE_COUNT,
};
pub use chapter::{
    Chapter, ChecklistItem, Highlight, PhaseFlags, PhaseMinutes, PhasePayload, QuestionEntry,
    ReadingPhase, ReciteAttempt, ReviewEntry, Subject,
};
pub use progress::{aggregate, aggregate_by_subject, ProgressReport, SubjectProgress};
pub use storage::{Config, Database, PlanRecord};
pub use error::{ChapterError, ConfigError, CoreError, DatabaseError};
