//! Raw API payloads
//!
//! Every field is optional so that partially filled responses still map;
//! the typed models substitute `None` for whatever is missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<RawPosition>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPosition {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEventTime {
    #[serde(default)]
    pub scheduled_at: Option<Value>,
    #[serde(default)]
    pub predicted_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDeparture {
    #[serde(default)]
    pub trip: Option<RawDepartureTrip>,
    #[serde(default)]
    pub departure: Option<RawEventTime>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDepartureTrip {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub headsign: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line_name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<RawDepartureType>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDepartureType {
    #[serde(default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTrip {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub stops: Option<Vec<RawStop>>,
    #[serde(default)]
    pub geojson: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStop {
    #[serde(default)]
    pub station: Option<RawStation>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub arrival: Option<RawEventTime>,
    #[serde(default)]
    pub departure: Option<RawEventTime>,
}

/// Endpoints that document a single object but may answer with a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

/// Accepts epoch milliseconds (number or numeric string) and RFC 3339 strings
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(text) => text
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
        _ => None,
    }
}

/// Numeric JSON values only; strings and nulls yield `None`
pub(crate) fn as_coordinate(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|f| f.is_finite())
}

/// Numbers become strings, any other non-string value becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_timestamp_millis() {
        let ts = parse_timestamp(&json!(1_609_460_622_000_i64)).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_609_460_622_000);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp(&json!("2021-01-01T00:23:42Z")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_609_460_622_000);

        let ts = parse_timestamp(&json!("2021-01-01T01:23:42+01:00")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_609_460_622_000);
    }

    #[test]
    fn test_parse_timestamp_numeric_string() {
        let ts = parse_timestamp(&json!("1609460622000")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_609_460_622_000);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp(&json!(null)).is_none());
        assert!(parse_timestamp(&json!("tomorrow")).is_none());
        assert!(parse_timestamp(&json!({ "ms": 1 })).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_coordinates_must_be_numbers() {
        assert_eq!(as_coordinate(Some(&json!(53.56))), Some(53.56));
        assert_eq!(as_coordinate(Some(&json!(10))), Some(10.0));
        assert!(as_coordinate(Some(&json!("53.56"))).is_none());
        assert!(as_coordinate(Some(&json!(null))).is_none());
        assert!(as_coordinate(None).is_none());
    }

    #[test]
    fn test_lenient_ids() {
        let station: RawStation = serde_json::from_value(json!({ "id": 42 })).unwrap();
        assert_eq!(station.id.as_deref(), Some("42"));

        let station: RawStation = serde_json::from_value(json!({ "id": null })).unwrap();
        assert!(station.id.is_none());
    }

    #[test]
    fn test_lenient_scalar_fields() {
        let departure: RawDeparture = serde_json::from_value(json!({
            "trip": {
                "headsign": ["Altona"],
                "line_name": 3,
                "type": { "kind": false, "product": "bus" },
                "provider": {}
            },
            "departure": { "platform": 5 }
        }))
        .unwrap();

        let trip = departure.trip.unwrap();
        assert!(trip.headsign.is_none());
        assert_eq!(trip.line_name.as_deref(), Some("3"));
        assert!(trip.provider.is_none());
        let kind = trip.kind.unwrap();
        assert!(kind.kind.is_none());
        assert_eq!(kind.product.as_deref(), Some("bus"));
        assert_eq!(departure.departure.unwrap().platform.as_deref(), Some("5"));

        let stop: RawStop = serde_json::from_value(json!({
            "station": { "id": "a", "name": 7 },
            "status": true
        }))
        .unwrap();
        assert!(stop.status.is_none());
        assert_eq!(stop.station.unwrap().name.as_deref(), Some("7"));
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<RawStation> =
            serde_json::from_value(json!({ "id": "a", "name": "A" })).unwrap();
        assert_eq!(one.into_first().unwrap().id.as_deref(), Some("a"));

        let many: OneOrMany<RawStation> =
            serde_json::from_value(json!([{ "id": "b" }, { "id": "c" }])).unwrap();
        assert_eq!(many.into_first().unwrap().id.as_deref(), Some("b"));

        let none: OneOrMany<RawStation> = serde_json::from_value(json!([])).unwrap();
        assert!(none.into_first().is_none());
    }
}
