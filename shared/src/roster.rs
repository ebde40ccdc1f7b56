use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bounds::{MapBounds, find_bounds};
use crate::member::ConsensusMember;

/// Cached consensus roster as served to clients. `seq` increments only when
/// `members` differs by value from the previous poll, so ETags derived from
/// it stay stable across no-op refreshes. `timestamp` is the time of the
/// poll that last changed the roster, not of the last poll attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub members: Vec<ConsensusMember>,
}

/// Deep value inequality over ordered member lists. Order-sensitive: the
/// upstream publishes the group in election order and marker numbering
/// follows it, so a reorder is a real change.
pub fn members_changed(old: &[ConsensusMember], new: &[ConsensusMember]) -> bool {
    old != new
}

/// Guards bounds recomputation behind [`members_changed`] so a periodic
/// refresh that returns identical data never moves the user's camera.
///
/// The recompute counter exists for tests; it is not part of the fitting
/// logic.
#[derive(Debug, Clone, Default)]
pub struct BoundsTracker {
    last_members: Option<Vec<ConsensusMember>>,
    recompute_count: u64,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute bounds iff `members` differs by value from the last
    /// observation (or this is the first one). `None` means no-op: keep the
    /// current camera.
    pub fn observe(&mut self, members: &[ConsensusMember]) -> Option<MapBounds> {
        match &self.last_members {
            Some(last) if !members_changed(last, members) => None,
            _ => Some(self.recompute(members)),
        }
    }

    /// Unconditional recompute; the reset-view control goes through here.
    pub fn force(&mut self, members: &[ConsensusMember]) -> MapBounds {
        self.recompute(members)
    }

    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    fn recompute(&mut self, members: &[ConsensusMember]) -> MapBounds {
        self.last_members = Some(members.to_vec());
        self.recompute_count += 1;
        find_bounds(members)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundsTracker, members_changed};
    use crate::member::ConsensusMember;

    fn member(address: &str, lng: f64, lat: f64) -> ConsensusMember {
        ConsensusMember {
            address: address.into(),
            name: None,
            lng: Some(lng),
            lat: Some(lat),
            geocode: Default::default(),
            elevation: None,
            owner: None,
        }
    }

    #[test]
    fn first_observation_always_recomputes() {
        let mut tracker = BoundsTracker::new();
        let roster = vec![member("a", 0.0, 0.0), member("b", 10.0, 10.0)];

        let bounds = tracker.observe(&roster);
        assert!(bounds.is_some());
        assert_eq!(tracker.recompute_count(), 1);
    }

    #[test]
    fn deep_equal_refresh_does_not_recompute() {
        let mut tracker = BoundsTracker::new();
        let roster = vec![member("a", 0.0, 0.0), member("b", 10.0, 10.0)];
        tracker.observe(&roster);

        // Fresh allocation, identical values: the situation every poll tick
        // produces when the consensus group has not changed.
        let same_values = vec![member("a", 0.0, 0.0), member("b", 10.0, 10.0)];
        assert!(tracker.observe(&same_values).is_none());
        assert_eq!(tracker.recompute_count(), 1);
    }

    #[test]
    fn added_member_recomputes_exactly_once() {
        let mut tracker = BoundsTracker::new();
        tracker.observe(&[member("a", 0.0, 0.0), member("b", 10.0, 10.0)]);

        let grown = vec![
            member("a", 0.0, 0.0),
            member("b", 10.0, 10.0),
            member("c", 20.0, -5.0),
        ];
        let bounds = tracker.observe(&grown).expect("change must recompute");
        assert_eq!(bounds.ne_lng, 20.0);
        assert_eq!(bounds.sw_lat, -5.0);
        assert_eq!(tracker.recompute_count(), 2);

        // Observing the grown roster again is a no-op.
        assert!(tracker.observe(&grown).is_none());
        assert_eq!(tracker.recompute_count(), 2);
    }

    #[test]
    fn moved_member_counts_as_change() {
        let mut tracker = BoundsTracker::new();
        tracker.observe(&[member("a", 0.0, 0.0)]);

        assert!(tracker.observe(&[member("a", 1.0, 0.0)]).is_some());
        assert_eq!(tracker.recompute_count(), 2);
    }

    #[test]
    fn reorder_counts_as_change() {
        let a = member("a", 0.0, 0.0);
        let b = member("b", 10.0, 10.0);
        assert!(members_changed(
            &[a.clone(), b.clone()],
            &[b.clone(), a.clone()]
        ));
    }

    #[test]
    fn force_recomputes_without_a_change() {
        let mut tracker = BoundsTracker::new();
        let roster = vec![member("a", 3.0, 4.0)];
        tracker.observe(&roster);

        tracker.force(&roster);
        assert_eq!(tracker.recompute_count(), 2);
    }
}
