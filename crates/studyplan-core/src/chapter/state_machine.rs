//! Phase transition operations for chapters.
//!
//! The single authoritative mutation path for `current_phase` and the done
//! flags. Completing a phase stages the change on a copy of the record, so
//! a failed guard returns an error with the chapter bit-for-bit untouched.

use chrono::Utc;

use super::payload::{PhasePayload, QuestionEntry};
use super::{Chapter, ReadingPhase};
use crate::error::ChapterError;

impl Chapter {
    // ── Commands ─────────────────────────────────────────────────────

    /// Persist payload for the chapter's current phase without advancing.
    ///
    /// Does not touch `current_phase` or the done flags. Repeating the call
    /// with the same payload leaves the chapter in the same state, so
    /// callers may save as often as they like (or coalesce saves) without
    /// behavioral difference.
    ///
    /// # Errors
    /// [`ChapterError::InvalidTransition`] on a completed chapter (there is
    /// no current phase to save into) and [`ChapterError::PayloadMismatch`]
    /// if the payload targets a different phase.
    pub fn save_partial(&mut self, payload: PhasePayload) -> Result<(), ChapterError> {
        self.ensure_active()?;
        self.ensure_payload_matches(&payload)?;
        self.apply_payload(payload);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Persist payload, mark the current phase done, and advance.
    ///
    /// `Review` advances to the terminal `Completed` state. The guard is
    /// evaluated after the payload applies; on failure nothing is written.
    /// A chapter that is already `Completed` rejects the call rather than
    /// ignoring it, so a double completion is distinguishable from a first
    /// one and aggregates cannot double-count.
    ///
    /// # Errors
    /// [`ChapterError::InvalidTransition`], [`ChapterError::PayloadMismatch`],
    /// or [`ChapterError::GuardNotSatisfied`].
    pub fn complete_phase(&mut self, payload: PhasePayload) -> Result<ReadingPhase, ChapterError> {
        self.ensure_active()?;
        self.ensure_payload_matches(&payload)?;

        let phase = self.current_phase;
        let mut staged = self.clone();
        staged.apply_payload(payload);
        staged.check_guard(phase)?;
        staged.flags.set(phase, true);
        staged.current_phase = staged.flags.first_unfinished();
        staged.updated_at = Utc::now();
        *self = staged;
        Ok(self.current_phase)
    }

    /// Explicitly reopen a phase the chapter has already reached.
    ///
    /// Clears the done flags for `target` and every later phase, preserves
    /// the flags strictly before it, and sets `current_phase = target`.
    /// This is the only backward transition; it never happens as a side
    /// effect of saving.
    ///
    /// # Errors
    /// [`ChapterError::InvalidTransition`] when `target` is the terminal
    /// state or lies ahead of the chapter's current phase.
    pub fn reopen_phase(&mut self, target: ReadingPhase) -> Result<(), ChapterError> {
        if target == ReadingPhase::Completed {
            return Err(ChapterError::InvalidTransition {
                current: self.current_phase,
                message: "the terminal state cannot be reopened".into(),
            });
        }
        if target.index() > self.current_phase.index() {
            return Err(ChapterError::InvalidTransition {
                current: self.current_phase,
                message: format!("cannot reopen {target}: the chapter has not reached it"),
            });
        }

        for phase in ReadingPhase::ORDER.into_iter().skip(target.index()) {
            self.flags.set(phase, false);
        }
        self.current_phase = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), ChapterError> {
        if self.current_phase.is_terminal() {
            return Err(ChapterError::InvalidTransition {
                current: self.current_phase,
                message: "chapter is already completed".into(),
            });
        }
        Ok(())
    }

    fn ensure_payload_matches(&self, payload: &PhasePayload) -> Result<(), ChapterError> {
        if payload.phase() != self.current_phase {
            return Err(ChapterError::PayloadMismatch {
                current: self.current_phase,
                payload_phase: payload.phase(),
            });
        }
        Ok(())
    }

    /// Overwrite the stored data for the payload's phase.
    fn apply_payload(&mut self, payload: PhasePayload) {
        match payload {
            PhasePayload::Survey {
                checklist,
                minutes_spent,
            } => {
                self.checklist = checklist;
                self.minutes.set(ReadingPhase::Survey, minutes_spent);
            }
            PhasePayload::Question {
                questions,
                minutes_spent,
            } => {
                self.questions = questions;
                self.minutes.set(ReadingPhase::Question, minutes_spent);
            }
            PhasePayload::Read {
                highlights,
                answers,
                minutes_spent,
            } => {
                self.highlights = highlights;
                self.questions = answers;
                self.minutes.set(ReadingPhase::Read, minutes_spent);
            }
            PhasePayload::Recite {
                attempts,
                minutes_spent,
            } => {
                self.recite_attempts = attempts;
                self.minutes.set(ReadingPhase::Recite, minutes_spent);
            }
            PhasePayload::Review {
                entries,
                minutes_spent,
            } => {
                self.review_entries = entries;
                self.minutes.set(ReadingPhase::Review, minutes_spent);
            }
        }
    }

    /// Domain guard for leaving `phase`, evaluated after the payload applied.
    fn check_guard(&self, phase: ReadingPhase) -> Result<(), ChapterError> {
        let requirement = match phase {
            ReadingPhase::Survey if !self.checklist.iter().any(|item| item.checked) => {
                "at least one checklist item must be checked"
            }
            ReadingPhase::Question if self.questions.is_empty() => {
                "at least one question must be recorded"
            }
            ReadingPhase::Read if !self.questions.iter().any(QuestionEntry::answered) => {
                "at least one question must be answered"
            }
            // Recite and Review need nothing beyond their payload, which the
            // typed variant match already enforced.
            _ => return Ok(()),
        };
        Err(ChapterError::GuardNotSatisfied {
            phase,
            requirement: requirement.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::{ChecklistItem, Highlight, PhaseFlags, ReciteAttempt, ReviewEntry};

    fn chapter() -> Chapter {
        Chapter::new("subject-1".into(), "Thermodynamics".into())
    }

    fn survey_payload() -> PhasePayload {
        PhasePayload::Survey {
            checklist: vec![
                ChecklistItem {
                    label: "Skim headings".into(),
                    checked: true,
                },
                ChecklistItem {
                    label: "Read summary".into(),
                    checked: false,
                },
            ],
            minutes_spent: 15,
        }
    }

    fn question_payload() -> PhasePayload {
        PhasePayload::Question {
            questions: vec![QuestionEntry {
                question: "What is entropy?".into(),
                answer: None,
            }],
            minutes_spent: 10,
        }
    }

    fn read_payload() -> PhasePayload {
        PhasePayload::Read {
            highlights: vec![Highlight {
                location: Some("p. 42".into()),
                text: "Entropy never decreases in an isolated system.".into(),
                note: None,
            }],
            answers: vec![QuestionEntry {
                question: "What is entropy?".into(),
                answer: Some("A measure of disorder.".into()),
            }],
            minutes_spent: 45,
        }
    }

    fn recite_payload() -> PhasePayload {
        PhasePayload::Recite {
            attempts: vec![ReciteAttempt {
                prompt: "State the second law".into(),
                recalled: true,
            }],
            minutes_spent: 20,
        }
    }

    fn review_payload() -> PhasePayload {
        PhasePayload::Review {
            entries: vec![ReviewEntry {
                note: "Revisit Carnot cycle derivation".into(),
            }],
            minutes_spent: 25,
        }
    }

    fn completed_chapter() -> Chapter {
        let mut chapter = chapter();
        chapter.complete_phase(survey_payload()).unwrap();
        chapter.complete_phase(question_payload()).unwrap();
        chapter.complete_phase(read_payload()).unwrap();
        chapter.complete_phase(recite_payload()).unwrap();
        chapter.complete_phase(review_payload()).unwrap();
        chapter
    }

    #[test]
    fn fresh_chapter_starts_in_survey() {
        let chapter = chapter();
        assert_eq!(chapter.current_phase, ReadingPhase::Survey);
        assert_eq!(chapter.flags, PhaseFlags::default());
        assert!(!chapter.completed());
    }

    #[test]
    fn completing_survey_advances_to_question() {
        let mut chapter = chapter();
        let next = chapter.complete_phase(survey_payload()).unwrap();
        assert_eq!(next, ReadingPhase::Question);
        assert!(chapter.flags.survey_done);
        assert_eq!(chapter.current_phase, ReadingPhase::Question);
    }

    #[test]
    fn full_walkthrough_reaches_terminal_state() {
        let chapter = completed_chapter();
        assert!(chapter.completed());
        assert!(chapter.flags.all_done());
        assert_eq!(chapter.current_phase, ReadingPhase::Completed);
    }

    #[test]
    fn completing_a_completed_chapter_is_rejected() {
        let mut chapter = completed_chapter();
        let before = chapter.clone();
        let err = chapter.complete_phase(review_payload()).unwrap_err();
        assert!(matches!(err, ChapterError::InvalidTransition { .. }));
        assert_eq!(chapter, before);
    }

    #[test]
    fn failed_guard_leaves_chapter_untouched() {
        let mut chapter = chapter();
        let before = chapter.clone();
        let payload = PhasePayload::Survey {
            checklist: vec![ChecklistItem {
                label: "Skim headings".into(),
                checked: false,
            }],
            minutes_spent: 5,
        };
        let err = chapter.complete_phase(payload).unwrap_err();
        assert!(matches!(
            err,
            ChapterError::GuardNotSatisfied {
                phase: ReadingPhase::Survey,
                ..
            }
        ));
        assert_eq!(chapter, before);
    }

    #[test]
    fn question_guard_requires_a_recorded_question() {
        let mut chapter = chapter();
        chapter.complete_phase(survey_payload()).unwrap();
        let payload = PhasePayload::Question {
            questions: vec![],
            minutes_spent: 0,
        };
        let err = chapter.complete_phase(payload).unwrap_err();
        assert!(matches!(err, ChapterError::GuardNotSatisfied { .. }));
        assert_eq!(chapter.current_phase, ReadingPhase::Question);
    }

    #[test]
    fn read_guard_requires_an_answered_question() {
        let mut chapter = chapter();
        chapter.complete_phase(survey_payload()).unwrap();
        chapter.complete_phase(question_payload()).unwrap();
        let payload = PhasePayload::Read {
            highlights: vec![],
            answers: vec![QuestionEntry {
                question: "What is entropy?".into(),
                answer: None,
            }],
            minutes_spent: 30,
        };
        let err = chapter.complete_phase(payload).unwrap_err();
        assert!(matches!(
            err,
            ChapterError::GuardNotSatisfied {
                phase: ReadingPhase::Read,
                ..
            }
        ));
    }

    #[test]
    fn save_partial_does_not_advance() {
        let mut chapter = chapter();
        chapter.save_partial(survey_payload()).unwrap();
        assert_eq!(chapter.current_phase, ReadingPhase::Survey);
        assert!(!chapter.flags.survey_done);
        assert_eq!(chapter.checklist.len(), 2);
        assert_eq!(chapter.minutes.survey, 15);
    }

    #[test]
    fn repeated_save_partial_is_idempotent() {
        let mut once = chapter();
        let mut twice = once.clone();
        once.save_partial(survey_payload()).unwrap();
        twice.save_partial(survey_payload()).unwrap();
        twice.save_partial(survey_payload()).unwrap();
        assert_eq!(once.current_phase, twice.current_phase);
        assert_eq!(once.flags, twice.flags);
        assert_eq!(once.checklist, twice.checklist);
        assert_eq!(once.minutes, twice.minutes);
    }

    #[test]
    fn save_partial_rejects_mismatched_payload() {
        let mut chapter = chapter();
        let err = chapter.save_partial(question_payload()).unwrap_err();
        assert!(matches!(
            err,
            ChapterError::PayloadMismatch {
                current: ReadingPhase::Survey,
                payload_phase: ReadingPhase::Question,
            }
        ));
    }

    #[test]
    fn save_partial_on_completed_chapter_is_rejected() {
        let mut chapter = completed_chapter();
        let err = chapter.save_partial(review_payload()).unwrap_err();
        assert!(matches!(err, ChapterError::InvalidTransition { .. }));
    }

    #[test]
    fn reopen_clears_target_and_later_flags() {
        let mut chapter = chapter();
        chapter.complete_phase(survey_payload()).unwrap();
        chapter.complete_phase(question_payload()).unwrap();
        chapter.complete_phase(read_payload()).unwrap();
        chapter.complete_phase(recite_payload()).unwrap();
        assert_eq!(chapter.current_phase, ReadingPhase::Review);

        chapter.reopen_phase(ReadingPhase::Read).unwrap();
        assert_eq!(chapter.current_phase, ReadingPhase::Read);
        assert!(!chapter.flags.read_done);
        assert!(!chapter.flags.recite_done);
        assert!(!chapter.flags.review_done);
        assert!(chapter.flags.survey_done);
        assert!(chapter.flags.question_done);
    }

    #[test]
    fn reopen_allows_finishing_again() {
        let mut chapter = completed_chapter();
        chapter.reopen_phase(ReadingPhase::Review).unwrap();
        assert_eq!(chapter.current_phase, ReadingPhase::Review);
        assert!(!chapter.completed());

        chapter.complete_phase(review_payload()).unwrap();
        assert!(chapter.completed());
    }

    #[test]
    fn reopen_ahead_of_current_phase_is_rejected() {
        let mut chapter = chapter();
        let err = chapter.reopen_phase(ReadingPhase::Read).unwrap_err();
        assert!(matches!(err, ChapterError::InvalidTransition { .. }));
        assert_eq!(chapter.current_phase, ReadingPhase::Survey);
    }

    #[test]
    fn reopen_terminal_state_is_rejected() {
        let mut chapter = completed_chapter();
        let err = chapter.reopen_phase(ReadingPhase::Completed).unwrap_err();
        assert!(matches!(err, ChapterError::InvalidTransition { .. }));
        assert!(chapter.completed());
    }

    #[test]
    fn forward_progression_is_monotonic() {
        let mut chapter = chapter();
        let payloads = [
            survey_payload(),
            question_payload(),
            read_payload(),
            recite_payload(),
            review_payload(),
        ];
        let mut last_index = chapter.current_phase.index();
        for payload in payloads {
            chapter.complete_phase(payload).unwrap();
            let index = chapter.current_phase.index();
            assert_eq!(index, last_index + 1);
            last_index = index;
        }
    }
}
