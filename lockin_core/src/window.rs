//! Daily validation window.
//!
//! On an obligated day a validation only counts when recorded between the
//! window's start and end times. Times are local wall-clock `HH:MM` values.

use crate::{Error, ObligationSchedule, Result};
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day window with `start < end`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct ValidationWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Serialize, Deserialize)]
struct RawWindow {
    start: String,
    end: String,
}

impl TryFrom<RawWindow> for ValidationWindow {
    type Error = Error;

    fn try_from(raw: RawWindow) -> Result<Self> {
        ValidationWindow::parse(&raw.start, &raw.end)
    }
}

impl From<ValidationWindow> for RawWindow {
    fn from(window: ValidationWindow) -> Self {
        RawWindow {
            start: format_hhmm(window.start),
            end: format_hhmm(window.end),
        }
    }
}

impl Default for ValidationWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(19, 0, 0).expect("19:00 is a valid time"),
            end: NaiveTime::from_hms_opt(21, 0, 0).expect("21:00 is a valid time"),
        }
    }
}

impl ValidationWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidWindow(format!(
                "end {} must be after start {}",
                format_hhmm(end),
                format_hhmm(start)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two `HH:MM` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Inclusive at both ends
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }

    /// Whether a validation recorded at `now` would count
    pub fn can_validate(&self, schedule: &ObligationSchedule, now: NaiveDateTime) -> bool {
        schedule.is_obligated(now.date()) && self.contains(now.time())
    }
}

impl fmt::Display for ValidationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Parse `H:MM` or `HH:MM` (hours 0-23, minutes two digits)
pub fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    let invalid = || Error::InvalidWindow(format!("{:?} is not HH:MM", value));

    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, RecurrenceRule, WeekdayIndex};
    use chrono::NaiveDate;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_window() {
        let window = ValidationWindow::default();
        assert_eq!(window.to_string(), "19:00-21:00");
    }

    #[test]
    fn test_parse_accepts_form_formats() {
        assert_eq!(parse_hhmm("7:05").unwrap(), time(7, 5));
        assert_eq!(parse_hhmm("07:05").unwrap(), time(7, 5));
        assert_eq!(parse_hhmm("23:59").unwrap(), time(23, 59));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["24:00", "7:5", "07:60", "0700", "", "ab:cd", "123:00"] {
            assert!(parse_hhmm(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(ValidationWindow::parse("21:00", "19:00").is_err());
        assert!(ValidationWindow::parse("19:00", "19:00").is_err());
        assert!(ValidationWindow::parse("19:00", "19:01").is_ok());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = ValidationWindow::parse("19:00", "21:00").unwrap();
        assert!(window.contains(time(19, 0)));
        assert!(window.contains(time(21, 0)));
        assert!(!window.contains(time(18, 59)));
        assert!(!window.contains(time(21, 1)));
    }

    #[test]
    fn test_serde_uses_hhmm_strings() {
        let window: ValidationWindow =
            serde_json::from_str(r#"{"start":"7:30","end":"09:00"}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&window).unwrap(),
            r#"{"start":"07:30","end":"09:00"}"#
        );
        let reversed = r#"{"start":"10:00","end":"09:00"}"#;
        assert!(serde_json::from_str::<ValidationWindow>(reversed).is_err());
    }

    #[test]
    fn test_can_validate_needs_obligated_day_and_open_window() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let schedule = ObligationSchedule::new(
            DateRange::new(start, end).unwrap(),
            RecurrenceRule::weekdays([WeekdayIndex::MONDAY]),
        );
        let window = ValidationWindow::default();

        assert!(window.can_validate(&schedule, start.and_time(time(20, 0))));
        assert!(!window.can_validate(&schedule, start.and_time(time(22, 0))));
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(!window.can_validate(&schedule, tuesday.and_time(time(20, 0))));
    }
}
