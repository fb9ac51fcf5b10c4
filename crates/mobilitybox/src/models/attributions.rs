//! Data source attributions

use serde::{Deserialize, Serialize};

/// Attribution notice that must accompany displayed Mobilitybox data
///
/// Passed through from the API as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributions {
    /// Notice as an HTML snippet
    #[serde(default)]
    pub html: Option<String>,
    /// Notice as plain text
    #[serde(default)]
    pub text: Option<String>,
    /// Link to the full attribution page
    #[serde(default)]
    pub url: Option<String>,
}
