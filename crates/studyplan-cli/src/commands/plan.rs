//! Study plan commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use studyplan_core::{
    CalendarAllocator, Config, Database, ExamMetadata, PhaseWeights, PlanEdit, PlanRecord,
    StudyPlanService,
};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Create a plan from exam metadata
    Create {
        /// First day of preparation (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Preparation duration in calendar months
        #[arg(long)]
        months: u32,
        /// Study hours per week (config default if omitted)
        #[arg(long)]
        weekly_hours: Option<u32>,
    },
    /// Show a plan (latest if no id given)
    Show {
        /// Plan ID
        #[arg(long)]
        id: Option<String>,
    },
    /// Edit a plan; the calendar is recomputed and replaced in full
    Edit {
        /// Plan ID (latest if omitted)
        #[arg(long)]
        id: Option<String>,
        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// New duration in months
        #[arg(long)]
        months: Option<u32>,
        /// New weekly hours
        #[arg(long)]
        weekly_hours: Option<u32>,
        /// Comma-separated phase weights summing to 100, e.g. 10,40,30,20
        #[arg(long)]
        weights: Option<String>,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let allocator = CalendarAllocator::with_weights(config.phase_weights()?);
    let service = StudyPlanService::with_allocator(Database::open()?, allocator);

    match action {
        PlanAction::Create {
            start,
            months,
            weekly_hours,
        } => {
            let record = service.create_plan(&ExamMetadata {
                start_date: start,
                total_months: months,
                weekly_hours: weekly_hours.unwrap_or(config.planner.default_weekly_hours),
            })?;
            println!("Plan created: {}", record.id);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        PlanAction::Show { id } => {
            let record = resolve_plan(service.database(), id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        PlanAction::Edit {
            id,
            start,
            months,
            weekly_hours,
            weights,
        } => {
            let record = resolve_plan(service.database(), id)?;
            let phase_weights = match weights {
                Some(raw) => {
                    let parsed = super::parse_weights(&raw)?;
                    // Validate up front so a typo fails before touching storage.
                    PhaseWeights::new(parsed)?;
                    Some(parsed)
                }
                None => None,
            };
            let edit = PlanEdit {
                start_date: start,
                total_months: months,
                weekly_hours,
                phase_weights,
            };
            let updated = service.edit_plan(&record.id, &edit)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
    }
    Ok(())
}

fn resolve_plan(
    db: &Database,
    id: Option<String>,
) -> Result<PlanRecord, Box<dyn std::error::Error>> {
    let record = match id {
        Some(id) => db.get_plan(&id)?,
        None => db.latest_plan()?,
    };
    record.ok_or_else(|| "no plan found; create one with `plan create`".into())
}
