//! Departures at a station

use std::fmt;

use serde::{Deserialize, Serialize};

use super::event_time::EventTime;
use super::raw::RawDeparture;

/// Vehicle classification of a departure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureType {
    /// Coarse mode, e.g. "train" or "bus"
    pub kind: Option<String>,
    /// Product, e.g. "regional" or "subway"
    pub product: Option<String>,
}

/// A single upcoming vehicle departure at a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Id of the trip this departure belongs to
    pub id: Option<String>,
    /// When the vehicle leaves
    pub departure_time: EventTime,
    /// Platform or track
    pub platform: Option<String>,
    /// Destination shown on the vehicle
    pub headsign: Option<String>,
    /// Line, e.g. "S21"
    pub line_name: Option<String>,
    /// Vehicle classification (all fields `None` if the API sent none)
    #[serde(rename = "type")]
    pub departure_type: DepartureType,
    /// Operating company
    pub provider: Option<String>,
}

impl Departure {
    pub(crate) fn from_raw(raw: RawDeparture) -> Self {
        let trip = raw.trip.unwrap_or_default();
        let departure_type = trip
            .kind
            .map(|kind| DepartureType {
                kind: kind.kind,
                product: kind.product,
            })
            .unwrap_or_default();

        Self {
            id: trip.id,
            departure_time: EventTime::from_raw(raw.departure.as_ref()),
            platform: raw.departure.and_then(|departure| departure.platform),
            headsign: trip.headsign,
            line_name: trip.line_name,
            departure_type,
            provider: trip.provider,
        }
    }
}

impl fmt::Display for Departure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .departure_time
            .scheduled_at_formatted()
            .unwrap_or_else(|| "--:--".to_string());
        let line = self.line_name.as_deref().unwrap_or("?");
        let headsign = self.headsign.as_deref().unwrap_or("");
        write!(f, "{time} {line} {headsign}")?;
        if let Some(platform) = &self.platform {
            write!(f, " (Gl. {platform})")?;
        }
        Ok(())
    }
}
