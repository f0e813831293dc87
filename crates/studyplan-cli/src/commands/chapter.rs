//! Chapter reading-protocol commands for CLI.
//!
//! Transition commands load the chapter, apply exactly one state-machine
//! operation, and replace the stored record. Nothing else writes the phase
//! state.

use clap::Subcommand;
use studyplan_core::{Chapter, Database, PhasePayload, ReadingPhase};

#[derive(Subcommand)]
pub enum ChapterAction {
    /// Add a chapter to a subject
    Add {
        /// Owning subject ID
        subject_id: String,
        /// Chapter title
        title: String,
    },
    /// List chapters
    List {
        /// Filter by subject ID
        #[arg(long)]
        subject_id: Option<String>,
    },
    /// Get chapter details
    Get {
        /// Chapter ID
        id: String,
    },
    /// Save phase data without advancing
    Save {
        /// Chapter ID
        id: String,
        /// Phase payload as JSON, e.g. '{"phase":"survey","checklist":[...]}'
        data: String,
    },
    /// Complete the current phase and advance
    Complete {
        /// Chapter ID
        id: String,
        /// Phase payload as JSON
        data: String,
    },
    /// Reopen an earlier phase, clearing it and everything after it
    Reopen {
        /// Chapter ID
        id: String,
        /// Target phase: survey, question, read, recite, or review
        phase: String,
    },
}

pub fn run(action: ChapterAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ChapterAction::Add { subject_id, title } => {
            if db.get_subject(&subject_id)?.is_none() {
                return Err(format!("no subject with id {subject_id}").into());
            }
            let chapter = Chapter::new(subject_id, title);
            db.replace_chapter(&chapter)?;
            println!("Chapter created: {}", chapter.id);
            println!("{}", serde_json::to_string_pretty(&chapter)?);
        }
        ChapterAction::List { subject_id } => {
            let chapters = match subject_id {
                Some(subject_id) => db.list_chapters_by_subject(&subject_id)?,
                None => db.list_chapters()?,
            };
            println!("{}", serde_json::to_string_pretty(&chapters)?);
        }
        ChapterAction::Get { id } => {
            let chapter = load_chapter(&db, &id)?;
            println!("{}", serde_json::to_string_pretty(&chapter)?);
        }
        ChapterAction::Save { id, data } => {
            let payload: PhasePayload = serde_json::from_str(&data)?;
            let mut chapter = load_chapter(&db, &id)?;
            chapter.save_partial(payload)?;
            db.replace_chapter(&chapter)?;
            println!("{}", serde_json::to_string_pretty(&chapter)?);
        }
        ChapterAction::Complete { id, data } => {
            let payload: PhasePayload = serde_json::from_str(&data)?;
            let mut chapter = load_chapter(&db, &id)?;
            let next = chapter.complete_phase(payload)?;
            db.replace_chapter(&chapter)?;
            println!("Advanced to: {next}");
            println!("{}", serde_json::to_string_pretty(&chapter)?);
        }
        ChapterAction::Reopen { id, phase } => {
            let target = parse_phase(&phase)?;
            let mut chapter = load_chapter(&db, &id)?;
            chapter.reopen_phase(target)?;
            db.replace_chapter(&chapter)?;
            println!("{}", serde_json::to_string_pretty(&chapter)?);
        }
    }
    Ok(())
}

fn load_chapter(db: &Database, id: &str) -> Result<Chapter, Box<dyn std::error::Error>> {
    db.get_chapter(id)?
        .ok_or_else(|| format!("no chapter with id {id}").into())
}

fn parse_phase(raw: &str) -> Result<ReadingPhase, Box<dyn std::error::Error>> {
    match raw {
        "survey" => Ok(ReadingPhase::Survey),
        "question" => Ok(ReadingPhase::Question),
        "read" => Ok(ReadingPhase::Read),
        "recite" => Ok(ReadingPhase::Recite),
        "review" => Ok(ReadingPhase::Review),
        _ => Err(format!("unknown phase: {raw}").into()),
    }
}
