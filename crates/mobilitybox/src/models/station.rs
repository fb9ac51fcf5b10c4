//! Stations

use std::fmt;
use std::sync::Weak;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::departure::Departure;
use super::raw::{RawStation, as_coordinate};
use crate::cancel::PendingCall;
use crate::client::{ClientInner, Mobilitybox};
use crate::error::MobilityboxError;

/// A geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates are finite numbers
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A station known to the Mobilitybox API
///
/// Keeps a non-owning handle to the client that produced it, so it can
/// fetch its own departures while the client is alive.
#[derive(Clone, Serialize)]
pub struct Station {
    /// Stable external identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Location, present only if the API sent both coordinates as numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip)]
    client: Weak<ClientInner>,
}

impl Station {
    pub(crate) fn from_raw(raw: RawStation, client: Weak<ClientInner>) -> Self {
        let position = raw.position.and_then(|position| {
            Some(Position::new(
                as_coordinate(position.latitude.as_ref())?,
                as_coordinate(position.longitude.as_ref())?,
            ))
        });

        Self {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            position,
            client,
        }
    }

    /// Fetch the next departures at this station
    ///
    /// `time` defaults to now. `max_departures` is forwarded to the API;
    /// the result is not truncated locally.
    pub fn get_next_departures(
        &self,
        time: Option<DateTime<Utc>>,
        max_departures: Option<u32>,
    ) -> PendingCall<Vec<Departure>> {
        match Mobilitybox::from_weak(&self.client) {
            Some(client) => client.get_departures(self.id.as_str(), time, max_departures),
            None => PendingCall::failed(MobilityboxError::ClientDropped),
        }
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.position == other.position
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn station(value: serde_json::Value) -> Station {
        Station::from_raw(serde_json::from_value(value).unwrap(), Weak::new())
    }

    #[test]
    fn test_full_station() {
        let station = station(json!({
            "id": "de:02000:10950",
            "name": "Hamburg Dammtor",
            "position": { "latitude": 53.560_75, "longitude": 9.989_56 }
        }));
        assert_eq!(station.id, "de:02000:10950");
        assert_eq!(station.name, "Hamburg Dammtor");
        assert_eq!(station.position, Some(Position::new(53.560_75, 9.989_56)));
    }

    #[test]
    fn test_partial_position_is_absent() {
        let partial = station(json!({
            "id": "x",
            "name": "X",
            "position": { "latitude": 53.56 }
        }));
        assert!(partial.position.is_none());

        let stringly = station(json!({
            "id": "x",
            "name": "X",
            "position": { "latitude": "53.56", "longitude": 9.98 }
        }));
        assert!(stringly.position.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let station = station(json!({}));
        assert!(station.id.is_empty());
        assert!(station.name.is_empty());
        assert!(station.position.is_none());
    }

    #[test]
    fn test_display_and_debug() {
        let station = station(json!({ "id": "a", "name": "Altona" }));
        assert_eq!(station.to_string(), "Altona");
        assert!(format!("{station:?}").contains("Altona"));
    }

    #[test]
    fn test_serialize_skips_client() {
        let station = station(json!({ "id": "a", "name": "Altona" }));
        let json = serde_json::to_value(&station).unwrap();
        assert_eq!(json, json!({ "id": "a", "name": "Altona" }));
    }

    #[tokio::test]
    async fn test_departures_without_client_fail() {
        let station = station(json!({ "id": "a", "name": "Altona" }));
        let result = station.get_next_departures(None, Some(5)).await;
        assert!(matches!(result, Err(MobilityboxError::ClientDropped)));
    }

    #[test]
    fn test_position_validity() {
        assert!(Position::new(53.5, 10.0).is_valid());
        assert!(!Position::new(f64::NAN, 10.0).is_valid());
    }
}
