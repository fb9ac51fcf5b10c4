//! Typed client for the Mobilitybox transit API
//!
//! Provides station search, departure boards, trip lookup and vector-tile map
//! sources for the [Mobilitybox](https://themobilitybox.com) API.
//!
//! # Architecture
//!
//! [`Mobilitybox`] is the gateway: it owns the access token and the
//! server-issued session token and performs every request. Responses are
//! mapped into [`Station`], [`Departure`], [`Trip`] and [`Stop`] values.
//! Stations keep a weak handle to the client so they can fetch their own
//! departures.
//!
//! Every request returns a [`PendingCall`]. Awaiting it yields the result;
//! cancelling it through [`PendingCall::cancel`] or a [`CancelHandle`] makes
//! sure it never resolves.
//!
//! # Example
//!
//! ```rust,ignore
//! use mobilitybox::Mobilitybox;
//!
//! let mobilitybox = Mobilitybox::new(Some("hallo_welt123".to_string()))?;
//!
//! let stations = mobilitybox.find_stations_by_name("Hamburg-Dammtor", None).await?;
//! let departures = stations[0].get_next_departures(None, Some(10)).await?;
//!
//! for departure in departures {
//!     println!("{departure}");
//! }
//! ```

mod cancel;
mod client;
mod config;
mod error;
mod models;
mod query;

pub use cancel::{CancelHandle, PendingCall};
pub use client::{DEFAULT_ID_TYPE, Mobilitybox, SESSION_TOKEN_HEADER};
pub use config::{DEFAULT_BASE_URL, MobilityboxConfig};
pub use error::MobilityboxError;
pub use models::{
    Attributions, Departure, DepartureType, EventTime, Position, Station, Stop, TileLayer, Trip,
    VectorTileSource,
};
pub use query::{StationRef, TimeRef};
