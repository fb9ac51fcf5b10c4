//! Vector tile sources for map renderers

use serde::{Deserialize, Serialize};

/// Tile layers served by the Mobilitybox API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLayer {
    /// Station locations
    StationMap,
    /// Routes served by transit lines
    TransitMap,
}

impl TileLayer {
    /// Path segment of the layer's tile endpoint
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::StationMap => "station_map",
            Self::TransitMap => "transit_map",
        }
    }
}

/// Source descriptor in the shape map renderers expect:
/// `{ "type": "vector", "tiles": ["…/{z}-{x}-{y}.mvt"] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorTileSource {
    /// Always `"vector"`
    #[serde(rename = "type")]
    pub source_type: String,
    /// URL templates with `{z}`, `{x}` and `{y}` placeholders
    pub tiles: Vec<String>,
}

impl VectorTileSource {
    /// Build the source for `layer`, appending `api_key` only when a token is given
    #[must_use]
    pub fn new(base_url: &str, layer: TileLayer, access_token: Option<&str>) -> Self {
        let mut template = format!("{base_url}/{}/{{z}}-{{x}}-{{y}}.mvt", layer.path());
        if let Some(token) = access_token {
            let encoded: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
            template.push_str("?api_key=");
            template.push_str(&encoded);
        }

        Self {
            source_type: "vector".to_string(),
            tiles: vec![template],
        }
    }
}
