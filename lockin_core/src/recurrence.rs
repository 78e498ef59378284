//! Recurrence engine mapping a goal's date range and rule to obligated days.
//!
//! All functions here are pure: the same `(range, rule)` always yields the
//! same obligations. The engine knows nothing about storage or validation
//! records; see `progress` for how obligations combine with those.
//!
//! Counting and membership never enumerate the range:
//! - `Everyday` counts are the inclusive day count
//! - `Weekdays` counts use full weeks plus the trailing partial week
//! - `CustomDates` counts are a range query on the ordered date set

use crate::{DateRange, Obligation, RecurrenceRule, WeekdayIndex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lazy, restartable sequence of obligations in ascending date order.
///
/// Clone the iterator (or call `compute_obligations` again) to restart.
#[derive(Clone, Debug)]
pub struct Obligations<'a> {
    rule: &'a RecurrenceRule,
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    index: usize,
}

impl Iterator for Obligations<'_> {
    type Item = Obligation;

    fn next(&mut self) -> Option<Obligation> {
        let from = self.cursor?;
        let Some(date) = first_match(self.rule, from, self.end) else {
            self.cursor = None;
            return None;
        };

        self.cursor = date.succ_opt().filter(|next| *next <= self.end);
        self.index += 1;
        Some(Obligation {
            date,
            index: self.index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Some(from) => (0, Some(crate::types::days_between_inclusive(from, self.end))),
            None => (0, Some(0)),
        }
    }
}

impl std::iter::FusedIterator for Obligations<'_> {}

/// Ordered obligations for `rule` over `range`.
///
/// The range was validated on construction, so this cannot fail; an empty
/// sequence means the goal has no obligated days.
pub fn compute_obligations<'a>(range: &DateRange, rule: &'a RecurrenceRule) -> Obligations<'a> {
    Obligations {
        rule,
        cursor: Some(range.start()),
        end: range.end(),
        index: 0,
    }
}

/// Number of obligated days; always equal to `compute_obligations(..).count()`
pub fn total_obligation_days(range: &DateRange, rule: &RecurrenceRule) -> usize {
    let total = match rule {
        RecurrenceRule::Everyday => range.len(),
        RecurrenceRule::Weekdays { days } => {
            if days.is_empty() {
                0
            } else {
                let len = range.len();
                let first = WeekdayIndex::of(range.start());
                let trailing = (0..len % 7)
                    .filter(|offset| days.contains(&first.offset(*offset)))
                    .count();
                (len / 7) * days.len() + trailing
            }
        }
        RecurrenceRule::CustomDates { dates } => dates.range(range.start()..=range.end()).count(),
    };

    tracing::debug!(
        "Counted {} obligation days for {} rule over {}",
        total,
        rule.kind(),
        range
    );
    total
}

/// Whether `date` is an obligated day; dates outside `range` never are
pub fn is_obligated(date: NaiveDate, range: &DateRange, rule: &RecurrenceRule) -> bool {
    range.contains(date) && rule.matches(date)
}

/// First date in `from..=end` matched by `rule`
fn first_match(rule: &RecurrenceRule, from: NaiveDate, end: NaiveDate) -> Option<NaiveDate> {
    if from > end {
        return None;
    }

    match rule {
        RecurrenceRule::Everyday => Some(from),
        RecurrenceRule::Weekdays { days } => {
            if days.is_empty() {
                return None;
            }
            from.iter_days()
                .take(7)
                .take_while(|d| *d <= end)
                .find(|d| days.contains(&WeekdayIndex::of(*d)))
        }
        RecurrenceRule::CustomDates { dates } => dates.range(from..=end).next().copied(),
    }
}

/// Last date in `start..=to` matched by `rule`
fn last_match(rule: &RecurrenceRule, start: NaiveDate, to: NaiveDate) -> Option<NaiveDate> {
    if start > to {
        return None;
    }

    match rule {
        RecurrenceRule::Everyday => Some(to),
        RecurrenceRule::Weekdays { days } => {
            let mut current = to;
            for _ in 0..7 {
                if current < start {
                    return None;
                }
                if days.contains(&WeekdayIndex::of(current)) {
                    return Some(current);
                }
                current = current.pred_opt()?;
            }
            None
        }
        RecurrenceRule::CustomDates { dates } => dates.range(start..=to).next_back().copied(),
    }
}

/// A goal's range and rule bundled together, with the derived queries the
/// display and compliance layers need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationSchedule {
    pub range: DateRange,
    pub rule: RecurrenceRule,
}

impl ObligationSchedule {
    pub fn new(range: DateRange, rule: RecurrenceRule) -> Self {
        Self { range, rule }
    }

    pub fn obligations(&self) -> Obligations<'_> {
        compute_obligations(&self.range, &self.rule)
    }

    pub fn total_days(&self) -> usize {
        total_obligation_days(&self.range, &self.rule)
    }

    pub fn is_obligated(&self, date: NaiveDate) -> bool {
        is_obligated(date, &self.range, &self.rule)
    }

    /// Position of `date` among obligated days ("day N of total")
    pub fn day_number(&self, date: NaiveDate) -> Option<usize> {
        if !self.is_obligated(date) {
            return None;
        }
        Some(self.elapsed_obligations(date))
    }

    /// Obligated days on or before `today`
    pub fn elapsed_obligations(&self, today: NaiveDate) -> usize {
        self.range
            .truncate_after(today)
            .map(|past| total_obligation_days(&past, &self.rule))
            .unwrap_or(0)
    }

    /// First obligation on or after `from`
    pub fn next_obligation(&self, from: NaiveDate) -> Option<Obligation> {
        let from = from.max(self.range.start());
        let date = first_match(&self.rule, from, self.range.end())?;
        Some(Obligation {
            date,
            index: self.elapsed_obligations(date),
        })
    }

    /// Most recent obligation on or before `date`
    pub fn previous_obligation(&self, date: NaiveDate) -> Option<Obligation> {
        let past = self.range.truncate_after(date)?;
        let found = last_match(&self.rule, past.start(), past.end())?;
        Some(Obligation {
            date: found,
            index: total_obligation_days(&past, &self.rule),
        })
    }
}
