use serde::{Deserialize, Serialize};

use crate::member::ConsensusMember;

/// Axis-aligned rectangle in longitude/latitude space, used to fit the map
/// viewport. Corner convention: south-west / north-east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub sw_lng: f64,
    pub sw_lat: f64,
    pub ne_lng: f64,
    pub ne_lat: f64,
}

impl MapBounds {
    /// Whole-world fallback returned when no member has a usable position.
    /// Latitude is clamped to ±85° so a fitted viewport stays inside the
    /// projectable band of the backdrop.
    pub const WORLD: MapBounds = MapBounds {
        sw_lng: -180.0,
        sw_lat: -85.0,
        ne_lng: 180.0,
        ne_lat: 85.0,
    };

    pub fn width(&self) -> f64 {
        self.ne_lng - self.sw_lng
    }

    pub fn height(&self) -> f64 {
        self.ne_lat - self.sw_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.sw_lng + self.ne_lng) / 2.0,
            (self.sw_lat + self.ne_lat) / 2.0,
        )
    }
}

/// Minimal axis-aligned box containing every member with a usable position.
///
/// Members with missing or non-finite coordinates are skipped. When nothing
/// remains (empty roster, or all positions missing) this returns
/// [`MapBounds::WORLD`] instead of failing; callers can always fit the
/// result. A single valid point yields a zero-extent box at that point —
/// degenerate extents are the viewport fitter's problem, not ours.
pub fn find_bounds(members: &[ConsensusMember]) -> MapBounds {
    let mut any = false;
    let (mut min_lng, mut min_lat) = (f64::MAX, f64::MAX);
    let (mut max_lng, mut max_lat) = (f64::MIN, f64::MIN);

    for m in members {
        let Some((lng, lat)) = m.position() else {
            continue;
        };
        any = true;
        min_lng = min_lng.min(lng);
        min_lat = min_lat.min(lat);
        max_lng = max_lng.max(lng);
        max_lat = max_lat.max(lat);
    }

    if !any {
        return MapBounds::WORLD;
    }

    MapBounds {
        sw_lng: min_lng,
        sw_lat: min_lat,
        ne_lng: max_lng,
        ne_lat: max_lat,
    }
}
