pub mod bounds;
pub mod city;
pub mod flags;
pub mod marker;
pub mod member;
pub mod names;
pub mod roster;
pub mod stats;

pub use bounds::{MapBounds, find_bounds};
pub use city::{CitiesEnvelope, City, CityOrder, parse_cities_body};
pub use flags::flag_emoji;
pub use marker::{MarkerView, build_markers, hotspot_route};
pub use member::{ConsensusMember, Geocode};
pub use names::display_name;
pub use roster::{BoundsTracker, RosterSnapshot, members_changed};
pub use stats::{NetworkStats, StatsEnvelope, StatsPayload, flatten};
