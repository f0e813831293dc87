//! Inverse calendar allocation.
//!
//! Splits a bounded preparation window across the four phases by fixed
//! percentage weights:
//! - End date is calendar-month arithmetic, not fixed 30-day blocks
//! - Day and hour shares are floored, then the entire rounding remainder
//!   goes to the last phase, so the shares sum exactly
//! - Phase date ranges chain back-to-back from the start date
//!
//! Allocation is a pure function over its inputs. The same metadata always
//! produces the same plan, which is what makes recomputation-on-edit
//! idempotent. Callers are responsible for persisting the result.

use chrono::{Duration, Months, NaiveDate};

use super::{ExamMetadata, PhaseName, PlanPhase, StudyPlan};
use crate::error::ConfigError;

/// Number of preparation phases in every plan.
pub const PHASE_COUNT: usize = 4;

/// Percentage weights for the four phases, validated to sum to exactly 100.
///
/// Weights that do not sum to 100 are a configuration defect: construction
/// fails with [`ConfigError::WeightSum`] and is never silently renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWeights([u32; PHASE_COUNT]);

impl PhaseWeights {
    /// Validate and wrap a weight array.
    ///
    /// # Errors
    /// Returns [`ConfigError::WeightSum`] if the weights do not sum to 100.
    pub fn new(weights: [u32; PHASE_COUNT]) -> Result<Self, ConfigError> {
        let sum: u32 = weights.iter().sum();
        if sum != 100 {
            return Err(ConfigError::WeightSum { weights, sum });
        }
        Ok(Self(weights))
    }

    pub fn as_array(&self) -> [u32; PHASE_COUNT] {
        self.0
    }
}

impl Default for PhaseWeights {
    /// The stock split: 10% setup, 40% learning, 30% consolidation,
    /// 20% simulation.
    fn default() -> Self {
        Self([10, 40, 30, 20])
    }
}

/// Distributes a preparation window across the four phases.
#[derive(Debug, Clone, Default)]
pub struct CalendarAllocator {
    weights: PhaseWeights,
}

impl CalendarAllocator {
    /// Create an allocator with the stock weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator with custom weights.
    pub fn with_weights(weights: PhaseWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> PhaseWeights {
        self.weights
    }

    /// Allocate a study plan from exam metadata.
    ///
    /// The window runs from `start_date` through the exam day
    /// (`start_date + total_months` calendar months), both endpoints
    /// included. Each phase gets `floor(total * weight / 100)` days and
    /// hours; the last phase additionally absorbs the full remainder of
    /// both splits.
    ///
    /// A phase may legitimately come out at zero days: flooring a small
    /// window against a small weight yields zero, and a zero-weight phase
    /// always does. That is expected degenerate output, not an error, as is
    /// `total_hours == 0` when `weekly_hours` is zero.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if `total_months` is zero or
    /// the end date would leave the supported calendar range.
    pub fn allocate(&self, metadata: &ExamMetadata) -> Result<StudyPlan, ConfigError> {
        if metadata.total_months == 0 {
            return Err(ConfigError::InvalidValue {
                key: "total_months".into(),
                message: "preparation duration must be at least one month".into(),
            });
        }

        let start = metadata.start_date;
        let end = start
            .checked_add_months(Months::new(metadata.total_months))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "total_months".into(),
                message: "end date exceeds the supported calendar range".into(),
            })?;

        let total_days = (end - start).num_days() + 1;
        let total_weeks = total_days as f64 / 7.0;
        let total_hours = (total_weeks * metadata.weekly_hours as f64).round() as i64;

        let weights = self.weights.as_array();
        let days = split_with_remainder(total_days, weights);
        let hours = split_with_remainder(total_hours, weights);

        let mut phases = Vec::with_capacity(PHASE_COUNT);
        let mut cursor = start;
        for (i, name) in PhaseName::ALL.iter().enumerate() {
            let phase_start = cursor;
            // A zero-day phase ends the day before it starts; the next phase
            // picks up at the same cursor, so contiguity still holds.
            let phase_end = phase_start + Duration::days(days[i] - 1);
            cursor = phase_start + Duration::days(days[i]);
            phases.push(PlanPhase {
                name: *name,
                weight_percent: weights[i],
                start_date: phase_start,
                end_date: phase_end,
                days: days[i],
                hours: hours[i],
            });
        }

        Ok(StudyPlan {
            start_date: start,
            end_date: end,
            total_months: metadata.total_months,
            weekly_hours: metadata.weekly_hours,
            total_days,
            total_hours,
            phases,
        })
    }
}

/// Floor-split `total` by percentage weights, assigning the entire rounding
/// remainder to the last share. The shares always sum to `total` exactly.
fn split_with_remainder(total: i64, weights: [u32; PHASE_COUNT]) -> [i64; PHASE_COUNT] {
    let mut shares = [0i64; PHASE_COUNT];
    for (share, weight) in shares.iter_mut().zip(weights) {
        *share = total * weight as i64 / 100;
    }
    let assigned: i64 = shares.iter().sum();
    shares[PHASE_COUNT - 1] += total - assigned;
    shares
}
