//! Scheduled and predicted event times

use std::fmt::Display;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::raw::{RawEventTime, parse_timestamp};

/// A scheduled time paired with the real-time prediction for it
///
/// Both sides are independently optional: the API omits predictions for
/// trips without live data, and occasionally the schedule too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    /// Time according to the timetable
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Real-time estimate
    pub predicted_at: Option<DateTime<Utc>>,
}

impl EventTime {
    /// Create an event time from two optional instants
    #[must_use]
    pub const fn new(
        scheduled_at: Option<DateTime<Utc>>,
        predicted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            scheduled_at,
            predicted_at,
        }
    }

    /// Create an event time from epoch milliseconds
    #[must_use]
    pub fn from_millis(scheduled_at: Option<i64>, predicted_at: Option<i64>) -> Self {
        Self {
            scheduled_at: scheduled_at.and_then(DateTime::from_timestamp_millis),
            predicted_at: predicted_at.and_then(DateTime::from_timestamp_millis),
        }
    }

    pub(crate) fn from_raw(raw: Option<&RawEventTime>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        Self {
            scheduled_at: raw.scheduled_at.as_ref().and_then(parse_timestamp),
            predicted_at: raw.predicted_at.as_ref().and_then(parse_timestamp),
        }
    }

    /// Scheduled time as epoch milliseconds
    #[must_use]
    pub fn scheduled_at_millis(&self) -> Option<i64> {
        self.scheduled_at.map(|t| t.timestamp_millis())
    }

    /// Predicted time as epoch milliseconds
    #[must_use]
    pub fn predicted_at_millis(&self) -> Option<i64> {
        self.predicted_at.map(|t| t.timestamp_millis())
    }

    /// Prediction minus schedule, if both are known
    #[must_use]
    pub fn delay(&self) -> Option<TimeDelta> {
        Some(self.predicted_at? - self.scheduled_at?)
    }

    /// Scheduled time as `H:MM` in the local time zone
    #[must_use]
    pub fn scheduled_at_formatted(&self) -> Option<String> {
        self.scheduled_at_formatted_in(&Local)
    }

    /// Predicted time as `H:MM` in the local time zone
    #[must_use]
    pub fn predicted_at_formatted(&self) -> Option<String> {
        self.predicted_at_formatted_in(&Local)
    }

    /// Scheduled date as `D.M.YYYY` in the local time zone
    #[must_use]
    pub fn scheduled_at_date_formatted(&self) -> Option<String> {
        self.scheduled_at_date_formatted_in(&Local)
    }

    /// Scheduled time as `H:MM` in `tz`
    pub fn scheduled_at_formatted_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<String>
    where
        Tz::Offset: Display,
    {
        self.scheduled_at.map(|t| format_time(t, tz))
    }

    /// Predicted time as `H:MM` in `tz`
    pub fn predicted_at_formatted_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<String>
    where
        Tz::Offset: Display,
    {
        self.predicted_at.map(|t| format_time(t, tz))
    }

    /// Scheduled date as `D.M.YYYY` in `tz`
    pub fn scheduled_at_date_formatted_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<String>
    where
        Tz::Offset: Display,
    {
        self.scheduled_at.map(|t| format_date(t, tz))
    }
}

fn format_time<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    time.with_timezone(tz).format("%-H:%M").to_string()
}

fn format_date<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    time.with_timezone(tz).format("%-d.%-m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Berlin;
    use serde_json::json;

    use super::*;

    const NEW_YEAR_00_23_42_UTC: i64 = 1_609_460_622_000;

    fn raw(value: serde_json::Value) -> RawEventTime {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_input_yields_nulls() {
        let time = EventTime::from_raw(None);
        assert!(time.scheduled_at.is_none());
        assert!(time.predicted_at.is_none());
    }

    #[test]
    fn test_numeric_fields_round_trip() {
        let payload = raw(json!({
            "scheduled_at": NEW_YEAR_00_23_42_UTC,
            "predicted_at": NEW_YEAR_00_23_42_UTC + 120_000
        }));
        let time = EventTime::from_raw(Some(&payload));
        assert_eq!(time.scheduled_at_millis(), Some(NEW_YEAR_00_23_42_UTC));
        assert_eq!(time.predicted_at_millis(), Some(NEW_YEAR_00_23_42_UTC + 120_000));
    }

    #[test]
    fn test_missing_field_yields_null_for_that_field_only() {
        let payload = raw(json!({ "scheduled_at": NEW_YEAR_00_23_42_UTC }));
        let time = EventTime::from_raw(Some(&payload));
        assert!(time.scheduled_at.is_some());
        assert!(time.predicted_at.is_none());

        let payload = raw(json!({ "scheduled_at": null, "predicted_at": NEW_YEAR_00_23_42_UTC }));
        let time = EventTime::from_raw(Some(&payload));
        assert!(time.scheduled_at.is_none());
        assert!(time.predicted_at.is_some());
    }

    #[test]
    fn test_time_formatting_berlin() {
        let time = EventTime::from_millis(Some(NEW_YEAR_00_23_42_UTC), None);
        assert_eq!(
            time.scheduled_at_formatted_in(&Berlin).as_deref(),
            Some("1:23")
        );
        assert!(time.predicted_at_formatted_in(&Berlin).is_none());
    }

    #[test]
    fn test_time_formatting_utc() {
        let time = EventTime::from_millis(None, Some(NEW_YEAR_00_23_42_UTC));
        assert_eq!(time.predicted_at_formatted_in(&Utc).as_deref(), Some("0:23"));
    }

    #[test]
    fn test_minutes_are_zero_padded() {
        // 2021-01-01T13:05:00Z
        let time = EventTime::from_millis(Some(1_609_506_300_000), None);
        assert_eq!(time.scheduled_at_formatted_in(&Utc).as_deref(), Some("13:05"));
    }

    #[test]
    fn test_date_formatting() {
        let time = EventTime::from_millis(Some(NEW_YEAR_00_23_42_UTC), None);
        assert_eq!(
            time.scheduled_at_date_formatted_in(&Utc).as_deref(),
            Some("1.1.2021")
        );
        assert!(EventTime::default().scheduled_at_date_formatted().is_none());
    }

    #[test]
    fn test_local_accessors_null_when_absent() {
        let time = EventTime::default();
        assert!(time.scheduled_at_formatted().is_none());
        assert!(time.predicted_at_formatted().is_none());
    }

    #[test]
    fn test_delay() {
        let time = EventTime::from_millis(Some(NEW_YEAR_00_23_42_UTC), Some(NEW_YEAR_00_23_42_UTC + 180_000));
        assert_eq!(time.delay(), Some(TimeDelta::minutes(3)));
        assert!(EventTime::from_millis(Some(NEW_YEAR_00_23_42_UTC), None).delay().is_none());
    }
}
