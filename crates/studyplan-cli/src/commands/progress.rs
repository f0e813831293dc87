//! Progress roll-up commands for CLI.

use clap::Subcommand;
use studyplan_core::{aggregate, aggregate_by_subject, Database};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Plan-level roll-up over all chapters
    All,
    /// Roll-up for a single subject
    Subject {
        /// Subject ID
        id: String,
    },
    /// Per-subject breakdown
    Subjects,
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProgressAction::All => {
            let report = aggregate(&db.list_chapters()?);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ProgressAction::Subject { id } => {
            let report = aggregate(&db.list_chapters_by_subject(&id)?);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ProgressAction::Subjects => {
            let breakdown = aggregate_by_subject(&db.list_chapters()?);
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
    }
    Ok(())
}
