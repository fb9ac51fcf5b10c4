//! Mobilitybox CLI
//!
//! Command-line front end for station search, departure boards and trips.

#![allow(clippy::print_stdout)]

use std::fmt::Display;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use mobilitybox::{Mobilitybox, MobilityboxConfig, PendingCall, Position, Station, Stop};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mobilitybox CLI
#[derive(Parser)]
#[command(name = "mobilitybox-cli")]
#[command(author, version, about = "Mobilitybox transit API CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// API access token
    #[arg(long, global = true, env = "MOBILITYBOX_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "MOBILITYBOX_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search stations by name
    ///
    /// Example: mobilitybox-cli stations Hamburg-Dammtor --lat 53.56 --lon 9.99
    Stations {
        /// Name to search for
        query: String,

        /// Latitude to bias results towards
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to bias results towards
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Find stations near a coordinate
    Nearby {
        /// Latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Look up a single station by id
    Station {
        /// Station id
        id: String,

        /// Id namespace
        #[arg(long, default_value = mobilitybox::DEFAULT_ID_TYPE)]
        id_type: String,
    },

    /// Show the next departures at a station
    Departures {
        /// Station id
        station_id: String,

        /// Maximum number of departures requested from the API
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Show a trip with all its stops
    Trip {
        /// Trip id
        id: String,
    },

    /// Show the data attributions to display alongside results
    Attributions,

    /// Print the vector tile sources for map renderers
    Tiles,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Combine optional coordinates into a position
fn position_from(lat: Option<f64>, lon: Option<f64>) -> Option<Position> {
    Some(Position::new(lat?, lon?))
}

/// Layer command-line overrides over the loaded configuration
fn build_config(
    mut config: MobilityboxConfig,
    token: Option<String>,
    base_url: Option<String>,
) -> MobilityboxConfig {
    if let Some(token) = token {
        config = config.with_access_token(token);
    }
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }
    config
}

fn station_line(station: &Station) -> String {
    match station.position {
        Some(position) => format!(
            "{} [{}] ({:.5}, {:.5})",
            station.name, station.id, position.latitude, position.longitude
        ),
        None => format!("{} [{}]", station.name, station.id),
    }
}

fn stop_line<Tz: TimeZone>(stop: &Stop, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let arrival = stop.arrival.scheduled_at_formatted_in(tz);
    let departure = stop.departure.scheduled_at_formatted_in(tz);
    let name = stop.station.as_ref().map_or("?", |station| station.name.as_str());

    let mut line = format!(
        "{:>5} {:>5}  {name}",
        arrival.as_deref().unwrap_or("-"),
        departure.as_deref().unwrap_or("-"),
    );
    if let Some(status) = stop.status.as_deref().filter(|status| *status != "scheduled") {
        line.push_str(&format!(" ({status})"));
    }
    line
}

/// Await a call, cancelling it on Ctrl-C
async fn run<T: Send + 'static>(call: PendingCall<T>) -> anyhow::Result<T> {
    let handle = call.cancel_handle();

    tokio::select! {
        result = call => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            anyhow::bail!("interrupted")
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = build_config(MobilityboxConfig::load()?, cli.token, cli.base_url);
    debug!(?config, "Using configuration");
    let client = Mobilitybox::from_config(&config)?;

    match cli.command {
        Commands::Stations { query, lat, lon } => {
            let stations = run(client.find_stations_by_name(&query, position_from(lat, lon))).await?;
            if stations.is_empty() {
                println!("No stations found for \"{query}\"");
            }
            for station in &stations {
                println!("🚉 {}", station_line(station));
            }
        },

        Commands::Nearby { lat, lon } => {
            let stations = run(client.find_stations_by_position(Position::new(lat, lon))).await?;
            for station in &stations {
                println!("📍 {}", station_line(station));
            }
        },

        Commands::Station { id, id_type } => {
            let station = run(client.find_stations_by_id(&id, Some(&id_type))).await?;
            println!("🚉 {}", station_line(&station));
        },

        Commands::Departures { station_id, max } => {
            let departures = run(client.get_departures(station_id.as_str(), None, max)).await?;
            if departures.is_empty() {
                println!("No upcoming departures");
            }
            for departure in &departures {
                println!("{departure}");
            }
        },

        Commands::Trip { id } => {
            let trip = run(client.get_trip(&id)).await?;

            println!("🚆 {}", trip.name.as_deref().unwrap_or(&id));
            if let Some(date) = trip.date_formatted() {
                println!("   {date}");
            }
            if let (Ok(Some(origin)), Ok(Some(destination))) =
                (trip.origins_from(), trip.destination())
            {
                println!("   {} → {}", origin.name, destination.name);
            }
            println!();
            for stop in &trip.stops {
                println!("{}", stop_line(stop, &Local));
            }
        },

        Commands::Attributions => {
            let attributions = run(client.get_attributions()).await?;
            if let Some(text) = attributions.text.or(attributions.html) {
                println!("{text}");
            }
            if let Some(url) = attributions.url {
                println!("{url}");
            }
        },

        Commands::Tiles => {
            println!("🗺️  Station map:");
            println!(
                "{}",
                serde_json::to_string_pretty(&client.station_map_vector_tile_source())?
            );
            println!("🗺️  Transit map:");
            println!(
                "{}",
                serde_json::to_string_pretty(&client.transit_map_vector_tile_source())?
            );
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use chrono_tz::Europe::Berlin;

    use super::*;

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), "info");
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), "debug");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn position_requires_both_coordinates() {
        assert_eq!(
            position_from(Some(53.56), Some(9.99)),
            Some(Position::new(53.56, 9.99))
        );
        assert!(position_from(Some(53.56), None).is_none());
        assert!(position_from(None, None).is_none());
    }

    #[test]
    fn build_config_applies_overrides() {
        let config = build_config(
            MobilityboxConfig::default(),
            Some("token".to_string()),
            Some("http://localhost:8080".to_string()),
        );
        assert_eq!(config.access_token(), Some("token"));
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn build_config_keeps_loaded_values() {
        let loaded = MobilityboxConfig::new(Some("loaded".to_string()));
        let config = build_config(loaded, None, None);
        assert_eq!(config.access_token(), Some("loaded"));
        assert_eq!(config.base_url, mobilitybox::DEFAULT_BASE_URL);
    }

    #[test]
    fn station_line_with_and_without_position() {
        let client = Mobilitybox::new(None).unwrap();
        let station = client
            .build_station(serde_json::json!({
                "id": "de:02000:10950",
                "name": "Hamburg Dammtor",
                "position": { "latitude": 53.560_751, "longitude": 9.989_566 }
            }))
            .unwrap();
        assert_eq!(
            station_line(&station),
            "Hamburg Dammtor [de:02000:10950] (53.56075, 9.98957)"
        );

        let station = client
            .build_station(serde_json::json!({ "id": "x", "name": "Nowhere" }))
            .unwrap();
        assert_eq!(station_line(&station), "Nowhere [x]");
    }

    #[test]
    fn stop_line_formats_times_and_status() {
        let client = Mobilitybox::new(None).unwrap();
        let trip_station = client
            .build_station(serde_json::json!({ "id": "d", "name": "Dammtor" }))
            .unwrap();
        let stop = Stop {
            station: Some(trip_station),
            status: Some("cancelled".to_string()),
            arrival: mobilitybox::EventTime::from_millis(Some(1_609_460_622_000), None),
            departure: mobilitybox::EventTime::default(),
        };
        assert_eq!(stop_line(&stop, &Berlin), " 1:23     -  Dammtor (cancelled)");
        assert_eq!(stop_line(&stop, &Utc), " 0:23     -  Dammtor (cancelled)");
    }
}
