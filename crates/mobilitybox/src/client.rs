//! Mobilitybox API client
//!
//! [`Mobilitybox`] is the only component that talks to the network. It owns
//! the credentials and the session token; every entity it returns keeps a
//! weak handle back to it for follow-up requests.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span, trace, warn};
use url::Url;

use crate::cancel::{CancelHandle, CancelToken, PendingCall};
use crate::config::MobilityboxConfig;
use crate::error::MobilityboxError;
use crate::models::raw::{OneOrMany, RawDeparture, RawStation, RawTrip};
use crate::models::{
    Attributions, Departure, Position, Station, TileLayer, Trip, VectorTileSource,
};
use crate::query::{StationRef, TimeRef, trip_characteristics_params};

/// Header carrying the server-issued session token, in both directions
pub const SESSION_TOKEN_HEADER: &str = "Session-Token";

/// Identifier namespace used by `find_stations_by_id` when none is given
pub const DEFAULT_ID_TYPE: &str = "mobilitybox";

type Params = Vec<(&'static str, String)>;

/// Shared state behind a [`Mobilitybox`] handle
pub(crate) struct ClientInner {
    http: Client,
    base_url: String,
    access_token: Option<SecretString>,
    session_token: RwLock<Option<String>>,
}

impl ClientInner {
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MobilityboxError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| MobilityboxError::Configuration(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                MobilityboxError::Configuration("base_url cannot carry a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&'static str, String)],
        token: &CancelToken,
    ) -> Result<R, MobilityboxError> {
        let mut request = self.http.get(url.clone()).query(params);
        if let Some(access_token) = &self.access_token {
            request = request.bearer_auth(access_token.expose_secret());
        }
        let session_token = self.session_token.read().clone();
        if let Some(session_token) = session_token {
            request = request.header(SESSION_TOKEN_HEADER, session_token);
        }

        debug!(%url, params = params.len(), "Sending request");

        let response = request.send().await?;
        token.checkpoint().await;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|body| !body.is_empty());
            warn!(status = status.as_u16(), %url, "Mobilitybox API returned an error status");
            return Err(MobilityboxError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        self.store_session_token(response.headers());

        let body = response.text().await?;
        token.checkpoint().await;

        serde_json::from_str(&body).map_err(|e| MobilityboxError::MalformedResponse(e.to_string()))
    }

    fn store_session_token(&self, headers: &HeaderMap) {
        let Some(value) = headers.get(SESSION_TOKEN_HEADER) else {
            return;
        };

        match value.to_str() {
            Ok(session_token) => {
                *self.session_token.write() = Some(session_token.to_string());
                trace!("Session token updated");
            },
            Err(_) => warn!("Ignoring session token that is not valid ASCII"),
        }
    }
}

/// Client for the Mobilitybox transit API
///
/// Cloning is cheap; clones share credentials and session state. Separate
/// `Mobilitybox::new` calls never share a session.
#[derive(Clone)]
pub struct Mobilitybox {
    inner: Arc<ClientInner>,
}

impl Mobilitybox {
    /// Create a client for the production endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(access_token: Option<String>) -> Result<Self, MobilityboxError> {
        Self::from_config(&MobilityboxConfig::new(access_token))
    }

    /// Create a client for a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is invalid or the HTTP client cannot be initialized.
    pub fn with_base_url(
        access_token: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, MobilityboxError> {
        Self::from_config(&MobilityboxConfig::new(access_token).with_base_url(base_url))
    }

    /// Create a client from a full configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn from_config(config: &MobilityboxConfig) -> Result<Self, MobilityboxError> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let http = builder
            .build()
            .map_err(|e| MobilityboxError::Configuration(e.to_string()))?;

        debug!(base_url = config.normalized_base_url(), "Created Mobilitybox client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.normalized_base_url().to_string(),
                access_token: config
                    .access_token()
                    .map(|token| SecretString::from(token.to_string())),
                session_token: RwLock::new(None),
            }),
        })
    }

    pub(crate) fn from_weak(inner: &Weak<ClientInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    fn downgrade(&self) -> Weak<ClientInner> {
        Arc::downgrade(&self.inner)
    }

    /// The bearer token, if any
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.inner
            .access_token
            .as_ref()
            .map(|token| token.expose_secret())
    }

    /// The API root all requests go to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The session token of the most recent response that carried one
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.inner.session_token.read().clone()
    }

    /// Replace the session token, e.g. to resume an earlier session
    pub fn set_session_token(&self, session_token: Option<String>) {
        *self.inner.session_token.write() = session_token;
    }

    /// Search stations by name, optionally biased towards a position
    pub fn find_stations_by_name(
        &self,
        query: &str,
        near: Option<Position>,
    ) -> PendingCall<Vec<Station>> {
        let mut params = vec![("query", query.to_string())];
        if let Some(position) = near.filter(Position::is_valid) {
            params.push(("longitude", position.longitude.to_string()));
            params.push(("latitude", position.latitude.to_string()));
        }

        self.call(&["stations", "search_by_name.json"], params, map_stations)
    }

    /// Find stations around a position
    ///
    /// Fails with [`MobilityboxError::InvalidArgument`] for non-finite coordinates.
    pub fn find_stations_by_position(&self, position: Position) -> PendingCall<Vec<Station>> {
        if !position.is_valid() {
            return PendingCall::failed(MobilityboxError::InvalidArgument(format!(
                "position must have finite coordinates, got ({}, {})",
                position.latitude, position.longitude
            )));
        }

        let params = vec![
            ("latitude", position.latitude.to_string()),
            ("longitude", position.longitude.to_string()),
        ];

        self.call(&["stations", "search_by_position.json"], params, map_stations)
    }

    /// Look up a single station by id
    ///
    /// `id_type` selects the identifier namespace and defaults to
    /// [`DEFAULT_ID_TYPE`].
    pub fn find_stations_by_id(&self, id: &str, id_type: Option<&str>) -> PendingCall<Station> {
        let params = vec![
            ("query", id.to_string()),
            ("id_type", id_type.unwrap_or(DEFAULT_ID_TYPE).to_string()),
        ];
        let id = id.to_string();

        self.call(
            &["stations", "search_by_id.json"],
            params,
            move |raw: OneOrMany<RawStation>, client| {
                raw.into_first()
                    .map(|station| Station::from_raw(station, client.clone()))
                    .ok_or(MobilityboxError::StationNotFound { id })
            },
        )
    }

    /// Fetch the attribution notice for displayed data
    pub fn get_attributions(&self) -> PendingCall<Attributions> {
        self.call(&["attributions.json"], Vec::new(), |raw: Attributions, _| {
            Ok(raw)
        })
    }

    /// Fetch a trip with all its stops
    pub fn get_trip(&self, id: &str) -> PendingCall<Trip> {
        let file = format!("{id}.json");
        self.call(&["trips", file.as_str()], Vec::new(), map_trip)
    }

    /// Find the trip that connects two stations at the given times
    ///
    /// Stations may be ids or [`Station`]s, times may be epoch milliseconds,
    /// instants or [`EventTime`](crate::EventTime)s (their scheduled time is used).
    /// `line_name` is only sent when given.
    pub fn find_trip_by_characteristics(
        &self,
        origin: impl Into<StationRef>,
        destination: impl Into<StationRef>,
        origin_departure_time: impl Into<TimeRef>,
        destination_arrival_time: impl Into<TimeRef>,
        line_name: Option<&str>,
    ) -> PendingCall<Trip> {
        let params = match trip_characteristics_params(
            &origin.into(),
            &destination.into(),
            origin_departure_time.into(),
            destination_arrival_time.into(),
            line_name,
        ) {
            Ok(params) => params,
            Err(e) => return PendingCall::failed(e),
        };

        self.call(
            &["trips", "search_by_characteristics.json"],
            params,
            map_trip,
        )
    }

    /// Fetch departures at a station from `time` (default now) on
    ///
    /// `max_departures` is forwarded to the API; the result is not truncated locally.
    pub fn get_departures(
        &self,
        station: impl Into<StationRef>,
        time: Option<DateTime<Utc>>,
        max_departures: Option<u32>,
    ) -> PendingCall<Vec<Departure>> {
        let time = time.unwrap_or_else(Utc::now);
        let mut params = vec![
            ("station_id", station.into().id().to_string()),
            ("time", time.timestamp_millis().to_string()),
        ];
        if let Some(max_departures) = max_departures {
            params.push(("max_departures", max_departures.to_string()));
        }

        self.call(
            &["departures.json"],
            params,
            |raw: Vec<RawDeparture>, _| Ok(raw.into_iter().map(Departure::from_raw).collect()),
        )
    }

    /// Build a station from data obtained elsewhere, without a request
    ///
    /// # Errors
    ///
    /// Returns [`MobilityboxError::MalformedResponse`] if `raw` is not a station object.
    pub fn build_station(&self, raw: Value) -> Result<Station, MobilityboxError> {
        if !raw.is_object() {
            return Err(MobilityboxError::MalformedResponse(
                "station data must be a JSON object".to_string(),
            ));
        }

        let raw: RawStation = serde_json::from_value(raw)
            .map_err(|e| MobilityboxError::MalformedResponse(e.to_string()))?;
        Ok(Station::from_raw(raw, self.downgrade()))
    }

    /// Tile source of the station map layer
    #[must_use]
    pub fn station_map_vector_tile_source(&self) -> VectorTileSource {
        VectorTileSource::new(self.base_url(), TileLayer::StationMap, self.access_token())
    }

    /// Tile source of the transit route map layer
    #[must_use]
    pub fn transit_map_vector_tile_source(&self) -> VectorTileSource {
        VectorTileSource::new(self.base_url(), TileLayer::TransitMap, self.access_token())
    }

    /// Tile source of the station map layer
    #[deprecated(note = "use `station_map_vector_tile_source`")]
    #[must_use]
    pub fn vector_tile_source(&self) -> VectorTileSource {
        self.station_map_vector_tile_source()
    }

    /// Tile source of the transit route map layer
    #[deprecated(note = "use `transit_map_vector_tile_source`")]
    #[must_use]
    pub fn relevant_routes_vector_tile_source(&self) -> VectorTileSource {
        self.transit_map_vector_tile_source()
    }

    /// Issue a GET request and map its JSON body with `map`
    fn call<R, T, F>(&self, segments: &[&str], params: Params, map: F) -> PendingCall<T>
    where
        R: DeserializeOwned + Send + 'static,
        T: Send + 'static,
        F: FnOnce(R, &Weak<ClientInner>) -> Result<T, MobilityboxError> + Send + 'static,
    {
        let url = match self.inner.endpoint(segments) {
            Ok(url) => url,
            Err(e) => return PendingCall::failed(e),
        };

        let handle = CancelHandle::new();
        let token = handle.token();
        let inner = Arc::clone(&self.inner);
        let span = debug_span!("mobilitybox_request", path = %url.path());

        PendingCall::new(
            handle,
            async move {
                let raw = inner.get_json::<R>(url, &params, &token).await?;
                token.checkpoint().await;
                map(raw, &Arc::downgrade(&inner))
            }
            .instrument(span),
        )
    }
}

impl fmt::Debug for Mobilitybox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mobilitybox")
            .field("base_url", &self.inner.base_url)
            .field(
                "access_token",
                &if self.inner.access_token.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field(
                "session_token",
                &if self.inner.session_token.read().is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .finish()
    }
}

#[allow(clippy::unnecessary_wraps)]
fn map_stations(
    raw: Vec<RawStation>,
    client: &Weak<ClientInner>,
) -> Result<Vec<Station>, MobilityboxError> {
    Ok(raw
        .into_iter()
        .map(|station| Station::from_raw(station, client.clone()))
        .collect())
}

#[allow(clippy::unnecessary_wraps)]
fn map_trip(raw: RawTrip, client: &Weak<ClientInner>) -> Result<Trip, MobilityboxError> {
    Ok(Trip::from_raw(raw, client))
}
