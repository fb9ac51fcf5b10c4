//! Mobilitybox data models
//!
//! Typed representations of stations, departures, trips and their stops,
//! mapped defensively from the API's JSON.

mod attributions;
mod departure;
mod event_time;
pub(crate) mod raw;
mod station;
mod tiles;
mod trip;

pub use attributions::Attributions;
pub use departure::{Departure, DepartureType};
pub use event_time::EventTime;
pub use station::{Position, Station};
pub use tiles::{TileLayer, VectorTileSource};
pub use trip::{Stop, Trip};
