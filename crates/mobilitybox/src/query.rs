//! Arguments that accept either a raw value or a model

use chrono::{DateTime, Utc};

use crate::error::MobilityboxError;
use crate::models::{EventTime, Station};

/// A station given by id or by a [`Station`] fetched earlier
#[derive(Debug, Clone, PartialEq)]
pub enum StationRef {
    /// Raw station id
    Id(String),
    /// A station; its `id` is used
    Station(Station),
}

impl StationRef {
    /// The station id sent to the API
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Station(station) => &station.id,
        }
    }
}

impl From<&str> for StationRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for StationRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<&Station> for StationRef {
    fn from(station: &Station) -> Self {
        Self::Station(station.clone())
    }
}

impl From<Station> for StationRef {
    fn from(station: Station) -> Self {
        Self::Station(station)
    }
}

/// A point in time given as epoch milliseconds, an instant, or an [`EventTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRef {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// An instant
    Instant(DateTime<Utc>),
    /// An event time; its `scheduled_at` is used
    EventTime(EventTime),
}

impl TimeRef {
    /// Epoch milliseconds sent to the API
    ///
    /// # Errors
    ///
    /// Returns [`MobilityboxError::InvalidArgument`] for an [`EventTime`]
    /// without a scheduled time.
    pub fn epoch_millis(&self) -> Result<i64, MobilityboxError> {
        match self {
            Self::Millis(millis) => Ok(*millis),
            Self::Instant(instant) => Ok(instant.timestamp_millis()),
            Self::EventTime(time) => time.scheduled_at_millis().ok_or_else(|| {
                MobilityboxError::InvalidArgument("event time has no scheduled_at".to_string())
            }),
        }
    }
}

impl From<i64> for TimeRef {
    fn from(millis: i64) -> Self {
        Self::Millis(millis)
    }
}

impl From<DateTime<Utc>> for TimeRef {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<EventTime> for TimeRef {
    fn from(time: EventTime) -> Self {
        Self::EventTime(time)
    }
}

impl From<&EventTime> for TimeRef {
    fn from(time: &EventTime) -> Self {
        Self::EventTime(*time)
    }
}

/// Query parameters of `/trips/search_by_characteristics.json`
pub(crate) fn trip_characteristics_params(
    origin: &StationRef,
    destination: &StationRef,
    origin_departure_time: TimeRef,
    destination_arrival_time: TimeRef,
    line_name: Option<&str>,
) -> Result<Vec<(&'static str, String)>, MobilityboxError> {
    let mut params = vec![
        ("origins_from_station_id", origin.id().to_string()),
        (
            "origins_from_departure_time",
            origin_departure_time.epoch_millis()?.to_string(),
        ),
        ("destination_station_id", destination.id().to_string()),
        (
            "destination_arrival_time",
            destination_arrival_time.epoch_millis()?.to_string(),
        ),
    ];

    if let Some(line_name) = line_name {
        params.push(("line_name", line_name.to_string()));
    }

    Ok(params)
}
