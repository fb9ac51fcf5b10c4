//! Mobilitybox error types

use thiserror::Error;

/// Errors that can occur while talking to the Mobilitybox API
#[derive(Debug, Error)]
pub enum MobilityboxError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("HTTP {status}{}", body_suffix(.body))]
    HttpStatus {
        /// Status code returned by the API (e.g. 401 for a missing or invalid token)
        status: u16,
        /// Response body, if one could be read
        body: Option<String>,
    },

    /// The response body is not JSON of the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A station lookup by id returned no station
    #[error("No station found for id {id}")]
    StationNotFound {
        /// The id that was looked up
        id: String,
    },

    /// Origin or destination was requested from a trip without stops
    #[error("Trip has no stops")]
    EmptyTrip,

    /// An argument cannot be turned into request parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The client an entity was created by no longer exists
    #[error("The Mobilitybox client was dropped")]
    ClientDropped,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MobilityboxError {
    /// HTTP status code, if the API answered with an error status
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the API rejected the credentials
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref().map(|b| format!(": {b}")).unwrap_or_default()
}
