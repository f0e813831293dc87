//! Configuration management commands for CLI.

use clap::Subcommand;
use studyplan_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the full configuration
    Show,
    /// Set the allocator phase weights
    SetWeights {
        /// Comma-separated weights summing to 100, e.g. 10,40,30,20
        weights: String,
    },
    /// Set the default weekly study hours
    SetWeeklyHours {
        hours: u32,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetWeights { weights } => {
            let mut config = Config::load()?;
            config.planner.phase_weights = super::parse_weights(&weights)?;
            // Fails loudly on a bad sum; nothing is written.
            config.phase_weights()?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::SetWeeklyHours { hours } => {
            let mut config = Config::load()?;
            config.planner.default_weekly_hours = hours;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
