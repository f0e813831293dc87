//! Subject management commands for CLI.

use clap::Subcommand;
use studyplan_core::{Database, Subject};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
    },
    /// List subjects
    List,
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SubjectAction::Add { name } => {
            let subject = Subject::new(name);
            db.replace_subject(&subject)?;
            println!("Subject created: {}", subject.id);
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectAction::List => {
            let subjects = db.list_subjects()?;
            println!("{}", serde_json::to_string_pretty(&subjects)?);
        }
    }
    Ok(())
}
