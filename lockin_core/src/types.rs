//! Core domain types for the LockIn obligation calendar.
//!
//! This module defines the values the recurrence engine consumes and produces:
//! - Inclusive civil date ranges
//! - Weekday indices (Sunday = 0 .. Saturday = 6)
//! - Recurrence rules as a closed enum
//! - Obligations, the engine's output

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Date Range
// ============================================================================

/// Inclusive range of civil dates with `start <= end`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Build a range, failing with `InvalidRange` when `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both endpoints included
    pub fn len(&self) -> usize {
        days_between_inclusive(self.start, self.end)
    }

    /// Always false: a valid range holds at least one day
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The part of this range that lies on or before `date`, if any
    pub fn truncate_after(&self, date: NaiveDate) -> Option<DateRange> {
        if date < self.start {
            return None;
        }
        Some(Self {
            start: self.start,
            end: self.end.min(date),
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Inclusive day count between two dates; 0 when `end < start`
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    let span = end.signed_duration_since(start).num_days();
    if span < 0 {
        0
    } else {
        span as usize + 1
    }
}

// ============================================================================
// Weekday Index
// ============================================================================

/// Day of the week as an index, Sunday = 0 through Saturday = 6
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct WeekdayIndex(u8);

impl WeekdayIndex {
    pub const SUNDAY: WeekdayIndex = WeekdayIndex(0);
    pub const MONDAY: WeekdayIndex = WeekdayIndex(1);
    pub const TUESDAY: WeekdayIndex = WeekdayIndex(2);
    pub const WEDNESDAY: WeekdayIndex = WeekdayIndex(3);
    pub const THURSDAY: WeekdayIndex = WeekdayIndex(4);
    pub const FRIDAY: WeekdayIndex = WeekdayIndex(5);
    pub const SATURDAY: WeekdayIndex = WeekdayIndex(6);

    /// Validate a raw index
    pub fn new(value: i64) -> Result<Self> {
        if (0..=6).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidWeekday(value))
        }
    }

    /// The weekday a date falls on
    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The weekday `days` days after this one
    pub fn offset(self, days: usize) -> Self {
        Self(((self.0 as usize + days) % 7) as u8)
    }

    pub fn to_weekday(self) -> Weekday {
        match self.0 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

impl From<Weekday> for WeekdayIndex {
    fn from(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_sunday() as u8)
    }
}

impl TryFrom<i64> for WeekdayIndex {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WeekdayIndex> for u8 {
    fn from(index: WeekdayIndex) -> Self {
        index.0
    }
}

// ============================================================================
// Recurrence Rule
// ============================================================================

/// Which days of a goal's range require a validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Every day of the range
    Everyday,
    /// Days whose weekday is in the set
    Weekdays { days: BTreeSet<WeekdayIndex> },
    /// Explicit dates; entries outside the range are kept but never count
    #[serde(rename = "custom")]
    CustomDates { dates: BTreeSet<NaiveDate> },
}

impl RecurrenceRule {
    pub fn weekdays<I: IntoIterator<Item = WeekdayIndex>>(days: I) -> Self {
        RecurrenceRule::Weekdays {
            days: days.into_iter().collect(),
        }
    }

    pub fn custom_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        RecurrenceRule::CustomDates {
            dates: dates.into_iter().collect(),
        }
    }

    /// Discriminator used by goal documents
    pub fn kind(&self) -> &'static str {
        match self {
            RecurrenceRule::Everyday => "everyday",
            RecurrenceRule::Weekdays { .. } => "weekdays",
            RecurrenceRule::CustomDates { .. } => "custom",
        }
    }

    /// Rule-only membership test, ignoring any range
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            RecurrenceRule::Everyday => true,
            RecurrenceRule::Weekdays { days } => days.contains(&WeekdayIndex::of(date)),
            RecurrenceRule::CustomDates { dates } => dates.contains(&date),
        }
    }

    /// True for configurations that can never match a date.
    ///
    /// These are valid inputs to the engine (they yield no obligations), but
    /// a goal form should reject them before a goal is created.
    pub fn is_vacuous(&self) -> bool {
        match self {
            RecurrenceRule::Everyday => false,
            RecurrenceRule::Weekdays { days } => days.is_empty(),
            RecurrenceRule::CustomDates { dates } => dates.is_empty(),
        }
    }
}

// ============================================================================
// Obligation
// ============================================================================

/// An obligated date with its 1-based position among all obligated dates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obligation {
    pub date: NaiveDate,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_rejects_reversed_endpoints() {
        let err = DateRange::new(date(2024, 1, 2), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_range_len_is_inclusive() {
        assert_eq!(DateRange::single(date(2024, 1, 1)).len(), 1);
        let leap_year = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(leap_year.len(), 366);
        assert_eq!(leap_year.days().count(), 366);
    }

    #[test]
    fn test_range_deserialize_validates() {
        let ok: DateRange =
            serde_json::from_str(r#"{"start":"2024-01-01","end":"2024-01-31"}"#).unwrap();
        assert_eq!(ok.len(), 31);

        let bad = serde_json::from_str::<DateRange>(r#"{"start":"2024-02-01","end":"2024-01-31"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_truncate_after() {
        let range = DateRange::new(date(2024, 1, 10), date(2024, 1, 20)).unwrap();
        assert_eq!(range.truncate_after(date(2024, 1, 9)), None);
        assert_eq!(
            range.truncate_after(date(2024, 1, 12)).unwrap().end(),
            date(2024, 1, 12)
        );
        assert_eq!(
            range.truncate_after(date(2024, 3, 1)).unwrap().end(),
            date(2024, 1, 20)
        );
    }

    #[test]
    fn test_weekday_convention_is_sunday_zero() {
        // 2024-01-07 is a Sunday, 2024-01-01 a Monday, 2024-01-06 a Saturday
        assert_eq!(WeekdayIndex::of(date(2024, 1, 7)), WeekdayIndex::SUNDAY);
        assert_eq!(WeekdayIndex::of(date(2024, 1, 1)), WeekdayIndex::MONDAY);
        assert_eq!(WeekdayIndex::of(date(2024, 1, 6)), WeekdayIndex::SATURDAY);
        assert_eq!(WeekdayIndex::SUNDAY.value(), 0);
        assert_eq!(WeekdayIndex::SATURDAY.value(), 6);
        assert_eq!(WeekdayIndex::WEDNESDAY.to_weekday(), Weekday::Wed);
    }

    #[test]
    fn test_weekday_rejects_out_of_range() {
        assert!(matches!(WeekdayIndex::new(7), Err(Error::InvalidWeekday(7))));
        assert!(matches!(WeekdayIndex::new(-1), Err(Error::InvalidWeekday(-1))));
        assert!(serde_json::from_str::<WeekdayIndex>("9").is_err());
    }

    #[test]
    fn test_rule_serde_shape() {
        let rule = RecurrenceRule::weekdays([WeekdayIndex::MONDAY, WeekdayIndex::FRIDAY]);
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r#"{"type":"weekdays","days":[1,5]}"#);

        let custom: RecurrenceRule =
            serde_json::from_str(r#"{"type":"custom","dates":["2024-01-05"]}"#).unwrap();
        assert_eq!(custom, RecurrenceRule::custom_dates([date(2024, 1, 5)]));
    }

    #[test]
    fn test_vacuous_rules() {
        assert!(!RecurrenceRule::Everyday.is_vacuous());
        assert!(RecurrenceRule::weekdays([]).is_vacuous());
        assert!(RecurrenceRule::custom_dates([]).is_vacuous());
    }
}
