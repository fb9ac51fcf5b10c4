//! Trips and their stops

use std::fmt::Display;
use std::sync::Weak;

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use super::event_time::EventTime;
use super::raw::{RawStop, RawTrip};
use super::station::Station;
use crate::client::ClientInner;
use crate::error::MobilityboxError;

/// One station visit within a trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// The station, if the API sent one
    pub station: Option<Station>,
    /// Real-time status, e.g. "cancelled"
    pub status: Option<String>,
    /// Arrival at this stop
    pub arrival: EventTime,
    /// Departure from this stop
    pub departure: EventTime,
}

impl Stop {
    pub(crate) fn from_raw(raw: RawStop, client: &Weak<ClientInner>) -> Self {
        Self {
            station: raw
                .station
                .map(|station| Station::from_raw(station, client.clone())),
            status: raw.status,
            arrival: EventTime::from_raw(raw.arrival.as_ref()),
            departure: EventTime::from_raw(raw.departure.as_ref()),
        }
    }
}

/// A single scheduled vehicle run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    /// Trip identifier
    pub id: Option<String>,
    /// Display name, e.g. "ICE 1601"
    pub name: Option<String>,
    /// Stops in travel order (empty if the API sent none)
    pub stops: Vec<Stop>,
    /// Route geometry as returned by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,
}

impl Trip {
    pub(crate) fn from_raw(raw: RawTrip, client: &Weak<ClientInner>) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            stops: raw
                .stops
                .unwrap_or_default()
                .into_iter()
                .map(|stop| Stop::from_raw(stop, client))
                .collect(),
            geojson: raw.geojson,
        }
    }

    /// Date range of the trip in the local time zone
    ///
    /// See [`date_formatted_in`](Self::date_formatted_in).
    #[must_use]
    pub fn date_formatted(&self) -> Option<String> {
        self.date_formatted_in(&Local)
    }

    /// Date range of the trip in `tz`
    ///
    /// The scheduled departure date of the first stop and the scheduled
    /// arrival date of the last stop, as `D.M.YYYY`. A single date when both
    /// are equal, `"<first> - <last>"` otherwise. When only one side is known
    /// that side is returned; `None` for trips without stops or times.
    pub fn date_formatted_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<String>
    where
        Tz::Offset: Display,
    {
        let start = self
            .stops
            .first()?
            .departure
            .scheduled_at_date_formatted_in(tz);
        let end = self
            .stops
            .last()?
            .arrival
            .scheduled_at_date_formatted_in(tz);

        match (start, end) {
            (Some(start), Some(end)) if start == end => Some(start),
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (Some(date), None) | (None, Some(date)) => Some(date),
            (None, None) => None,
        }
    }

    /// Station of the first stop
    ///
    /// # Errors
    ///
    /// Returns [`MobilityboxError::EmptyTrip`] if the trip has no stops.
    pub fn origins_from(&self) -> Result<Option<&Station>, MobilityboxError> {
        self.stops
            .first()
            .map(|stop| stop.station.as_ref())
            .ok_or(MobilityboxError::EmptyTrip)
    }

    /// Station of the last stop
    ///
    /// # Errors
    ///
    /// Returns [`MobilityboxError::EmptyTrip`] if the trip has no stops.
    pub fn destination(&self) -> Result<Option<&Station>, MobilityboxError> {
        self.stops
            .last()
            .map(|stop| stop.station.as_ref())
            .ok_or(MobilityboxError::EmptyTrip)
    }
}
