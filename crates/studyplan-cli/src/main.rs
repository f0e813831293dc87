use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyplan-cli", version, about = "Studyplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Study plan management
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Subject management
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Chapter reading-protocol workflow
    Chapter {
        #[command(subcommand)]
        action: commands::chapter::ChapterAction,
    },
    /// Progress roll-ups
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Subject { action } => commands::subject::run(action),
        Commands::Chapter { action } => commands::chapter::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
