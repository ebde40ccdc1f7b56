use lattice_shared::NetworkStats;

/// Stale-while-revalidate holder for the stats panel. Poll outcomes are
/// funneled through [`StatsFeed::apply`]; a failed poll keeps the last good
/// snapshot on screen and only records the error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsFeed {
    data: Option<NetworkStats>,
    error: Option<String>,
}

impl StatsFeed {
    /// Start the feed, optionally seeded with an already-known snapshot so
    /// the panel renders numbers on first paint.
    pub fn new(initial: Option<NetworkStats>) -> Self {
        Self {
            data: initial,
            error: None,
        }
    }

    /// Fold one poll outcome into the feed. `Ok(None)` means the server is
    /// reachable but still waiting for its own upstream; that clears any
    /// stale error and keeps the feed in its loading state.
    pub fn apply(&mut self, outcome: Result<Option<NetworkStats>, String>) {
        match outcome {
            Ok(Some(stats)) => {
                self.data = Some(stats);
                self.error = None;
            }
            Ok(None) => {
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e);
            }
        }
    }

    pub fn data(&self) -> Option<&NetworkStats> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True only before any data has ever arrived and no fetch has failed.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::StatsFeed;
    use lattice_shared::NetworkStats;
    use lattice_shared::stats::{GlobalCounts, StatsPayload, flatten};

    fn stats(hotspots: u64) -> NetworkStats {
        flatten(StatsPayload {
            counts: GlobalCounts {
                hotspots,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn empty_feed_is_loading() {
        let feed = StatsFeed::new(None);
        assert!(feed.is_loading());
        assert!(!feed.is_error());
        assert!(feed.data().is_none());
    }

    #[test]
    fn seeded_feed_renders_immediately() {
        let feed = StatsFeed::new(Some(stats(5)));
        assert!(!feed.is_loading());
        assert_eq!(feed.data().unwrap().total_hotspots, 5);
    }

    #[test]
    fn success_replaces_data_and_clears_error() {
        let mut feed = StatsFeed::new(None);
        feed.apply(Err("HTTP 502".into()));
        feed.apply(Ok(Some(stats(7))));

        assert_eq!(feed.data().unwrap().total_hotspots, 7);
        assert!(!feed.is_error());
    }

    #[test]
    fn failure_keeps_stale_data() {
        let mut feed = StatsFeed::new(None);
        feed.apply(Ok(Some(stats(7))));
        feed.apply(Err("fetch error: timed out".into()));

        assert_eq!(feed.data().unwrap().total_hotspots, 7);
        assert!(feed.is_error());
        assert_eq!(feed.error(), Some("fetch error: timed out"));
        assert!(!feed.is_loading());
    }

    #[test]
    fn server_not_ready_stays_loading() {
        let mut feed = StatsFeed::new(None);
        feed.apply(Ok(None));

        assert!(feed.is_loading());
        assert!(!feed.is_error());
    }

    #[test]
    fn server_not_ready_clears_an_earlier_error() {
        let mut feed = StatsFeed::new(None);
        feed.apply(Err("HTTP 500".into()));
        assert!(feed.is_error());

        feed.apply(Ok(None));
        assert!(!feed.is_error());
        assert!(feed.is_loading());
    }
}
