//! Progress derived from obligated days and recorded validations.
//!
//! The compliance recorder stores which dates were validated; this module
//! combines that set with an `ObligationSchedule` to produce what the goal
//! screens show:
//! - per-day status (success, failed, pending, inactive)
//! - "day N of total" and remaining days
//! - the current streak
//! - the week strip around today
//! - money recovered and still at stake
//!
//! Validated dates that are not obligated days are ignored everywhere.

use crate::{Obligation, ObligationSchedule};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status of a single calendar day for a goal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    /// Obligated and validated
    Success,
    /// Obligated, in the past, never validated
    Failed,
    /// Obligated, today or later, not yet validated
    Pending,
    /// Not an obligated day
    Inactive,
}

impl HabitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitStatus::Success => "success",
            HabitStatus::Failed => "failed",
            HabitStatus::Pending => "pending",
            HabitStatus::Inactive => "inactive",
        }
    }
}

/// One cell of the week strip
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    pub status: HabitStatus,
}

/// Status of `date` as seen on `today`
pub fn day_status(
    schedule: &ObligationSchedule,
    validated: &BTreeSet<NaiveDate>,
    date: NaiveDate,
    today: NaiveDate,
) -> HabitStatus {
    if !schedule.is_obligated(date) {
        HabitStatus::Inactive
    } else if validated.contains(&date) {
        HabitStatus::Success
    } else if date < today {
        HabitStatus::Failed
    } else {
        HabitStatus::Pending
    }
}

/// Consecutive validated obligated days ending at the latest one on or
/// before `today`. An unvalidated obligation on `today` is still pending and
/// does not break the streak.
pub fn current_streak(
    schedule: &ObligationSchedule,
    validated: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> usize {
    let mut cursor = schedule.previous_obligation(today);
    if let Some(obligation) = cursor {
        if obligation.date == today && !validated.contains(&today) {
            cursor = step_back(schedule, obligation);
        }
    }

    let mut streak = 0;
    while let Some(obligation) = cursor {
        if !validated.contains(&obligation.date) {
            break;
        }
        streak += 1;
        cursor = step_back(schedule, obligation);
    }
    streak
}

fn step_back(schedule: &ObligationSchedule, obligation: Obligation) -> Option<Obligation> {
    schedule.previous_obligation(obligation.date.pred_opt()?)
}

/// The seven days of the week containing `today`, starting on `week_start`
pub fn week_progress(
    schedule: &ObligationSchedule,
    validated: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    week_start: Weekday,
) -> Vec<DayProgress> {
    let back = (7 + today.weekday().num_days_from_sunday() - week_start.num_days_from_sunday()) % 7;
    let Some(first) = today.checked_sub_days(Days::new(u64::from(back))) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take(7)
        .map(|date| DayProgress {
            date,
            status: day_status(schedule, validated, date, today),
        })
        .collect()
}

/// Summary figures for a goal as of a given day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Validated obligated days up to and including today
    pub current_day: usize,
    pub total_days: usize,
    /// Obligated days up to and including today
    pub elapsed_days: usize,
    pub remaining_days: usize,
    pub current_streak: usize,
    pub today_obligated: bool,
    pub today_validated: bool,
    pub next_validation: Option<Obligation>,
    pub percent_complete: f64,
}

impl GoalProgress {
    pub fn compute(
        schedule: &ObligationSchedule,
        validated: &BTreeSet<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        let total_days = schedule.total_days();
        let current_day = validated
            .range(..=today)
            .filter(|d| schedule.is_obligated(**d))
            .count();
        let today_obligated = schedule.is_obligated(today);
        let today_validated = today_obligated && validated.contains(&today);

        let next_validation = if today_obligated && !today_validated {
            schedule.next_obligation(today)
        } else {
            today.succ_opt().and_then(|d| schedule.next_obligation(d))
        };

        let percent_complete = if total_days == 0 {
            0.0
        } else {
            current_day as f64 / total_days as f64 * 100.0
        };

        tracing::debug!(
            "Progress on {}: {}/{} validated, {} elapsed",
            today,
            current_day,
            total_days,
            schedule.elapsed_obligations(today)
        );

        Self {
            current_day,
            total_days,
            elapsed_days: schedule.elapsed_obligations(today),
            remaining_days: total_days - current_day,
            current_streak: current_streak(schedule, validated, today),
            today_obligated,
            today_validated,
            next_validation,
            percent_complete,
        }
    }
}

/// Deposit bookkeeping for a goal
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundsSummary {
    pub deposited: f64,
    pub recovered: f64,
    /// Deposit not yet recovered, never negative
    pub at_stake: f64,
    /// Share of the deposit recovered; 0 when nothing was deposited
    pub percent_recovered: f64,
}

impl FundsSummary {
    pub fn new(deposited: f64, recovered: f64) -> Self {
        let percent_recovered = if deposited > 0.0 {
            recovered / deposited * 100.0
        } else {
            0.0
        };

        Self {
            deposited,
            recovered,
            at_stake: (deposited - recovered).max(0.0),
            percent_recovered,
        }
    }
}
