//! Goal documents as stored by the application's document database.
//!
//! A stored goal carries its recurrence as a discriminator string plus two
//! optional arrays. This module is the only place that shape is understood;
//! everything past it works with `RecurrenceRule`.

use crate::progress::FundsSummary;
use crate::{
    DateRange, Error, ObligationSchedule, RecurrenceRule, Result, ValidationWindow, WeekdayIndex,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// A goal record in its stored (camelCase JSON) form
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDocument {
    #[serde(default)]
    pub title: String,

    pub start_date: String,
    pub end_date: String,

    #[serde(default = "default_validation_type")]
    pub validation_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_window: Option<ValidationWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_deposited: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_recovered: Option<f64>,

    #[serde(default)]
    pub validated_days: Vec<String>,
}

fn default_validation_type() -> String {
    "everyday".into()
}

impl GoalDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a goal document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let goal = Self::from_json(&contents)?;
        tracing::info!("Loaded goal {:?} from {:?}", goal.title, path);
        Ok(goal)
    }

    pub fn range(&self) -> Result<DateRange> {
        DateRange::new(parse_date(&self.start_date)?, parse_date(&self.end_date)?)
    }

    pub fn rule(&self) -> Result<RecurrenceRule> {
        RecurrenceRule::from_parts(
            &self.validation_type,
            self.weekdays.as_deref(),
            self.custom_days.as_deref(),
        )
    }

    /// The goal's range and rule, validated
    pub fn schedule(&self) -> Result<ObligationSchedule> {
        Ok(ObligationSchedule::new(self.range()?, self.rule()?))
    }

    /// Deposit and recovery figures, if the goal carries a deposit
    pub fn funds(&self) -> Option<FundsSummary> {
        let deposited = self.amount_deposited?;
        Some(FundsSummary::new(deposited, self.amount_recovered.unwrap_or(0.0)))
    }

    /// Dates the compliance recorder marked as validated
    pub fn validated_days(&self) -> Result<BTreeSet<NaiveDate>> {
        self.validated_days.iter().map(|d| parse_date(d)).collect()
    }
}

impl RecurrenceRule {
    /// Build a rule from a stored discriminator and its optional payloads.
    ///
    /// A payload that does not belong to the discriminator is ignored, so a
    /// record with both arrays populated still yields a single rule.
    pub fn from_parts(
        kind: &str,
        weekdays: Option<&[i64]>,
        custom_days: Option<&[String]>,
    ) -> Result<Self> {
        match kind {
            "everyday" => {
                warn_ignored(kind, "weekdays", weekdays.is_some_and(|w| !w.is_empty()));
                warn_ignored(kind, "customDays", custom_days.is_some_and(|c| !c.is_empty()));
                Ok(RecurrenceRule::Everyday)
            }
            "weekdays" => {
                warn_ignored(kind, "customDays", custom_days.is_some_and(|c| !c.is_empty()));
                let days = weekdays
                    .unwrap_or_default()
                    .iter()
                    .map(|d| WeekdayIndex::new(*d))
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok(RecurrenceRule::Weekdays { days })
            }
            "custom" => {
                warn_ignored(kind, "weekdays", weekdays.is_some_and(|w| !w.is_empty()));
                let dates = custom_days
                    .unwrap_or_default()
                    .iter()
                    .map(|d| parse_date(d))
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok(RecurrenceRule::CustomDates { dates })
            }
            other => Err(Error::UnsupportedRule(other.to_string())),
        }
    }
}

fn warn_ignored(kind: &str, field: &str, present: bool) {
    if present {
        tracing::warn!("Ignoring {} on a {:?} goal", field, kind);
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(format!("{:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const WEEKDAY_GOAL: &str = r#"{
        "id": "goal_1712345_abc",
        "title": "Morning run",
        "startDate": "2024-01-01",
        "endDate": "2024-01-07",
        "validationType": "weekdays",
        "weekdays": [1, 3, 5],
        "validationWindow": { "start": "07:00", "end": "09:30" },
        "amountDeposited": 50,
        "totalDays": 3,
        "status": "active",
        "validatedDays": ["2024-01-01"]
    }"#;

    #[test]
    fn test_weekday_goal_document() {
        let goal = GoalDocument::from_json(WEEKDAY_GOAL).unwrap();
        let schedule = goal.schedule().unwrap();

        assert_eq!(goal.title, "Morning run");
        assert_eq!(schedule.total_days(), 3);
        assert_eq!(
            schedule.obligations().map(|o| o.date).collect::<Vec<_>>(),
            vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)]
        );
        assert_eq!(goal.validated_days().unwrap().len(), 1);
        assert_eq!(goal.amount_deposited, Some(50.0));
        let funds = goal.funds().unwrap();
        assert_eq!(funds.recovered, 0.0);
        assert_eq!(funds.at_stake, 50.0);
        assert!(goal.validation_window.is_some());
    }

    #[test]
    fn test_missing_validation_type_defaults_to_everyday() {
        let goal = GoalDocument::from_json(
            r#"{"startDate": "2024-01-01", "endDate": "2024-01-30"}"#,
        )
        .unwrap();
        let schedule = goal.schedule().unwrap();
        assert_eq!(schedule.rule, RecurrenceRule::Everyday);
        assert_eq!(schedule.total_days(), 30);
    }

    #[test]
    fn test_amount_recovered_is_read() {
        let goal = GoalDocument::from_json(
            r#"{
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "amountDeposited": 80,
                "amountRecovered": 20
            }"#,
        )
        .unwrap();
        let funds = goal.funds().unwrap();
        assert_eq!(funds.recovered, 20.0);
        assert_eq!(funds.at_stake, 60.0);
        assert_eq!(funds.percent_recovered, 25.0);

        let no_deposit =
            GoalDocument::from_json(r#"{"startDate": "2024-01-01", "endDate": "2024-01-31"}"#)
                .unwrap();
        assert!(no_deposit.funds().is_none());
    }

    #[test]
    fn test_unknown_discriminator_is_unsupported() {
        let err = RecurrenceRule::from_parts("monthly", None, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedRule(kind) if kind == "monthly"));
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(matches!(
            RecurrenceRule::from_parts("weekdays", Some(&[1, 7][..]), None),
            Err(Error::InvalidWeekday(7))
        ));
        assert!(matches!(
            RecurrenceRule::from_parts("custom", None, Some(&["2024-13-01".to_string()][..])),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn test_contradictory_payload_is_ignored() {
        let rule = RecurrenceRule::from_parts(
            "weekdays",
            Some(&[0, 6][..]),
            Some(&["2024-01-05".to_string()][..]),
        )
        .unwrap();
        assert_eq!(
            rule,
            RecurrenceRule::weekdays([WeekdayIndex::SUNDAY, WeekdayIndex::SATURDAY])
        );
    }

    #[test]
    fn test_missing_payload_is_vacuous_not_error() {
        let rule = RecurrenceRule::from_parts("weekdays", None, None).unwrap();
        assert!(rule.is_vacuous());
        let rule = RecurrenceRule::from_parts("custom", None, Some(&[][..])).unwrap();
        assert!(rule.is_vacuous());
    }

    #[test]
    fn test_reversed_goal_dates() {
        let goal = GoalDocument::from_json(
            r#"{"startDate": "2024-02-01", "endDate": "2024-01-01", "validationType": "everyday"}"#,
        )
        .unwrap();
        assert!(matches!(goal.schedule(), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(WEEKDAY_GOAL.as_bytes()).unwrap();

        let goal = GoalDocument::load(file.path()).unwrap();
        assert_eq!(goal.validation_type, "weekdays");
        assert_eq!(goal.weekdays, Some(vec![1, 3, 5]));
    }
}
