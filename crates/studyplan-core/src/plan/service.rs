//! Plan orchestration over the allocator and storage.
//!
//! Every edit merges into the stored inputs, re-runs the allocator, and
//! replaces the stored plan wholesale. There is no partial recomputation
//! path, so the sum invariants hold after every write by construction.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::allocator::{CalendarAllocator, PhaseWeights, PHASE_COUNT};
use super::ExamMetadata;
use crate::error::{CoreError, DatabaseError};
use crate::storage::{Database, PlanRecord};

/// A user edit to an existing plan. Unset fields keep their stored values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEdit {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_months: Option<u32>,
    #[serde(default)]
    pub weekly_hours: Option<u32>,
    #[serde(default)]
    pub phase_weights: Option<[u32; PHASE_COUNT]>,
}

/// Orchestrates allocation and persistence for study plans.
pub struct StudyPlanService {
    db: Database,
    allocator: CalendarAllocator,
}

impl StudyPlanService {
    /// Create a service with the stock allocator weights.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            allocator: CalendarAllocator::new(),
        }
    }

    /// Create a service with a custom allocator (e.g. config-driven weights).
    pub fn with_allocator(db: Database, allocator: CalendarAllocator) -> Self {
        Self { db, allocator }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Allocate a plan from exam metadata and persist it.
    pub fn create_plan(&self, metadata: &ExamMetadata) -> Result<PlanRecord, CoreError> {
        let plan = self.allocator.allocate(metadata)?;
        let now = Utc::now();
        let record = PlanRecord {
            id: Uuid::new_v4().to_string(),
            plan,
            created_at: now,
            updated_at: now,
        };
        self.db.replace_plan(&record)?;
        Ok(record)
    }

    /// Apply a user edit: merge it into the stored inputs, re-allocate, and
    /// replace the stored plan in full.
    ///
    /// The record keeps its id and creation time; the plan itself -- the
    /// whole phase list included -- is swapped for the recomputed one.
    pub fn edit_plan(&self, id: &str, edit: &PlanEdit) -> Result<PlanRecord, CoreError> {
        let record = self
            .db
            .get_plan(id)?
            .ok_or_else(|| DatabaseError::NotFound {
                kind: "plan",
                id: id.to_string(),
            })?;

        let metadata = ExamMetadata {
            start_date: edit.start_date.unwrap_or(record.plan.start_date),
            total_months: edit.total_months.unwrap_or(record.plan.total_months),
            weekly_hours: edit.weekly_hours.unwrap_or(record.plan.weekly_hours),
        };
        let weights = PhaseWeights::new(edit.phase_weights.unwrap_or_else(|| record.plan.weights()))?;

        let plan = CalendarAllocator::with_weights(weights).allocate(&metadata)?;
        let updated = PlanRecord {
            id: record.id,
            plan,
            created_at: record.created_at,
            updated_at: Utc::now(),
        };
        self.db.replace_plan(&updated)?;
        Ok(updated)
    }
}
