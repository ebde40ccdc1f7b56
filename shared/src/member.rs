use serde::{Deserialize, Serialize};

/// One consensus-group member as published by the upstream roster endpoint.
///
/// `address` is the identity key. Coordinates and geocode are optional: the
/// upstream contract does not guarantee them for freshly asserted hotspots,
/// so every consumer (bounds, markers) must tolerate their absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusMember {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub geocode: Geocode,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<i32>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geocode {
    #[serde(default)]
    pub short_country: Option<String>,
    #[serde(default)]
    pub long_country: Option<String>,
    #[serde(default)]
    pub short_city: Option<String>,
    #[serde(default)]
    pub long_city: Option<String>,
}

impl ConsensusMember {
    /// `(lng, lat)` when both coordinates are present and finite, else `None`.
    /// Members without a usable position are skipped by bounds computation and
    /// marker layout rather than drawn at the origin.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) if lng.is_finite() && lat.is_finite() => Some((lng, lat)),
            _ => None,
        }
    }

    pub fn has_valid_position(&self) -> bool {
        self.position().is_some()
    }
}
