//! Study plan model and calendar allocation.

mod allocator;
mod service;

pub use allocator::{CalendarAllocator, PhaseWeights, PHASE_COUNT};
pub use service::{PlanEdit, StudyPlanService};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exam metadata driving plan allocation.
///
/// Produced by the extraction pipeline or entered directly by the user;
/// either way it is the complete input the allocator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamMetadata {
    /// First day of preparation.
    pub start_date: NaiveDate,
    /// Preparation duration in calendar months.
    pub total_months: u32,
    /// Hours of study per week.
    pub weekly_hours: u32,
}

/// One of the four sequential preparation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseName {
    /// Orientation: gather material, set up the environment.
    Setup,
    /// Main content acquisition.
    Learning,
    /// Repetition and deepening.
    Consolidation,
    /// Mock exams under realistic conditions.
    Simulation,
}

impl PhaseName {
    /// The four phases in execution order.
    pub const ALL: [PhaseName; PHASE_COUNT] = [
        PhaseName::Setup,
        PhaseName::Learning,
        PhaseName::Consolidation,
        PhaseName::Simulation,
    ];
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseName::Setup => "setup",
            PhaseName::Learning => "learning",
            PhaseName::Consolidation => "consolidation",
            PhaseName::Simulation => "simulation",
        };
        write!(f, "{name}")
    }
}

/// A single preparation phase with its slice of the calendar.
///
/// Owned exclusively by its [`StudyPlan`] and replaced wholesale with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub name: PhaseName,
    /// Percentage of the total window assigned to this phase.
    pub weight_percent: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub hours: i64,
}

/// A full preparation calendar: four contiguous, non-overlapping phases
/// covering the window from `start_date` through `end_date` inclusive.
///
/// Plans are pure values with no identity; record identity and timestamps
/// live on [`crate::storage::PlanRecord`]. Recomputation on edit replaces
/// the whole phase list, which keeps the sum invariants
/// (`sum(days) == total_days`, `sum(hours) == total_hours`) trivially true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub start_date: NaiveDate,
    /// Exam day: `start_date` plus `total_months` calendar months.
    pub end_date: NaiveDate,
    pub total_months: u32,
    pub weekly_hours: u32,
    /// Days in the window, both endpoints included.
    pub total_days: i64,
    /// `round(total_days / 7 * weekly_hours)`.
    pub total_hours: i64,
    pub phases: Vec<PlanPhase>,
}

impl StudyPlan {
    /// The inputs this plan was allocated from.
    pub fn metadata(&self) -> ExamMetadata {
        ExamMetadata {
            start_date: self.start_date,
            total_months: self.total_months,
            weekly_hours: self.weekly_hours,
        }
    }

    /// The weights the phases were split by, recoverable for recomputation.
    pub fn weights(&self) -> [u32; PHASE_COUNT] {
        let mut weights = [0u32; PHASE_COUNT];
        for (slot, phase) in weights.iter_mut().zip(&self.phases) {
            *slot = phase.weight_percent;
        }
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn plan_serialization() {
        let plan = StudyPlan {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 5, 1),
            total_months: 4,
            weekly_hours: 10,
            total_days: 122,
            total_hours: 174,
            phases: vec![PlanPhase {
                name: PhaseName::Setup,
                weight_percent: 10,
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 12),
                days: 12,
                hours: 17,
            }],
        };

        let json = serde_json::to_string(&plan).unwrap();
        let decoded: StudyPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, plan);
    }

    #[test]
    fn weights_recovered_from_phases() {
        let phases = PhaseName::ALL
            .iter()
            .zip([10u32, 40, 30, 20])
            .map(|(name, weight)| PlanPhase {
                name: *name,
                weight_percent: weight,
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 1),
                days: 1,
                hours: 0,
            })
            .collect();
        let plan = StudyPlan {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 5, 1),
            total_months: 4,
            weekly_hours: 0,
            total_days: 122,
            total_hours: 0,
            phases,
        };
        assert_eq!(plan.weights(), [10, 40, 30, 20]);
    }
}
