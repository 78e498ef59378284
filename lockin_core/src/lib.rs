#![forbid(unsafe_code)]

//! Core domain model and obligation logic for LockIn.
//!
//! This crate provides:
//! - Domain types (date ranges, weekday indices, recurrence rules)
//! - The recurrence engine (obligated days, counts, membership)
//! - Goal document parsing
//! - Validation windows
//! - Progress and streak derivation

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod recurrence;
pub mod goal;
pub mod window;
pub mod progress;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use recurrence::{
    compute_obligations, is_obligated, total_obligation_days, ObligationSchedule, Obligations,
};
pub use goal::{parse_date, GoalDocument};
pub use window::ValidationWindow;
pub use progress::{
    current_streak, day_status, week_progress, DayProgress, FundsSummary, GoalProgress,
    HabitStatus,
};
