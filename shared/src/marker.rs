use serde::{Deserialize, Serialize};

use crate::flags::flag_emoji;
use crate::member::ConsensusMember;
use crate::names::display_name;

/// Everything the map needs to draw one marker and its tooltip. A pure
/// projection of a roster record; no rendering types leak in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    /// 1-based roster position. Members skipped for missing coordinates keep
    /// their number, so badges match the published consensus ordering.
    pub index: usize,
    pub address: String,
    pub lng: f64,
    pub lat: f64,
    /// Derived display name shown in the tooltip.
    pub label: String,
    pub flag: Option<String>,
    pub country: Option<String>,
    /// Detail-page path; marker clicks navigate here.
    pub route: String,
}

pub fn hotspot_route(address: &str) -> String {
    format!("/hotspots/{address}")
}

/// Project the roster into renderable markers, skipping members without a
/// usable position.
pub fn build_markers(members: &[ConsensusMember]) -> Vec<MarkerView> {
    members
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let (lng, lat) = m.position()?;
            Some(MarkerView {
                index: i + 1,
                address: m.address.clone(),
                lng,
                lat,
                label: display_name(&m.address),
                flag: m.geocode.short_country.as_deref().and_then(flag_emoji),
                country: m.geocode.short_country.clone(),
                route: hotspot_route(&m.address),
            })
        })
        .collect()
}
