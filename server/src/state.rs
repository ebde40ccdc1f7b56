use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use lattice_shared::{NetworkStats, RosterSnapshot};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};

/// Latest consensus roster plus its pre-serialized wire payload. Serialized
/// once by the poller, shared by every request via Arc.
#[derive(Debug, Clone)]
pub struct RosterCache {
    pub snapshot: RosterSnapshot,
    pub payload_json: Arc<Bytes>,
}

impl Default for RosterCache {
    fn default() -> Self {
        let snapshot = RosterSnapshot {
            seq: 0,
            timestamp: Utc::now(),
            members: Vec::new(),
        };
        let payload_json = serde_json::to_vec(&snapshot)
            .map(Bytes::from)
            .unwrap_or_else(|_| {
                Bytes::from_static(br#"{"seq":0,"timestamp":null,"members":[]}"#)
            });

        Self {
            snapshot,
            payload_json: Arc::new(payload_json),
        }
    }
}

/// Latest flattened stats. `stats` stays `None` until the first successful
/// poll; after that a failed poll keeps the stale value and only updates
/// `last_error` (clients keep rendering the last good numbers).
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    pub seq: u64,
    pub stats: Option<NetworkStats>,
    pub payload_json: Option<Arc<Bytes>>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RwLock<RosterCache>>,
    pub stats: Arc<RwLock<StatsCache>>,
    pub http_client: reqwest::Client,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    roster_poll_successes_total: AtomicU64,
    roster_poll_failures_total: AtomicU64,
    roster_changes_total: AtomicU64,
    stats_poll_successes_total: AtomicU64,
    stats_poll_failures_total: AtomicU64,
    members_requests_total: AtomicU64,
    stats_requests_total: AtomicU64,
    cities_proxy_requests_total: AtomicU64,
    cities_proxy_upstream_errors_total: AtomicU64,
    not_modified_responses_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub roster_poll_successes_total: u64,
    pub roster_poll_failures_total: u64,
    pub roster_changes_total: u64,
    pub stats_poll_successes_total: u64,
    pub stats_poll_failures_total: u64,
    pub members_requests_total: u64,
    pub stats_requests_total: u64,
    pub cities_proxy_requests_total: u64,
    pub cities_proxy_upstream_errors_total: u64,
    pub not_modified_responses_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            roster_poll_successes_total: self.roster_poll_successes_total.load(Ordering::Relaxed),
            roster_poll_failures_total: self.roster_poll_failures_total.load(Ordering::Relaxed),
            roster_changes_total: self.roster_changes_total.load(Ordering::Relaxed),
            stats_poll_successes_total: self.stats_poll_successes_total.load(Ordering::Relaxed),
            stats_poll_failures_total: self.stats_poll_failures_total.load(Ordering::Relaxed),
            members_requests_total: self.members_requests_total.load(Ordering::Relaxed),
            stats_requests_total: self.stats_requests_total.load(Ordering::Relaxed),
            cities_proxy_requests_total: self.cities_proxy_requests_total.load(Ordering::Relaxed),
            cities_proxy_upstream_errors_total: self
                .cities_proxy_upstream_errors_total
                .load(Ordering::Relaxed),
            not_modified_responses_total: self.not_modified_responses_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_roster_poll_success(&self) {
        self.roster_poll_successes_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_roster_poll_failure(&self) {
        self.roster_poll_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_roster_change(&self) {
        self.roster_changes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stats_poll_success(&self) {
        self.stats_poll_successes_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stats_poll_failure(&self) {
        self.stats_poll_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_members_request(&self) {
        self.members_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stats_request(&self) {
        self.stats_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cities_proxy_request(&self) {
        self.cities_proxy_requests_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cities_proxy_upstream_error(&self) {
        self.cities_proxy_upstream_errors_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_modified_response(&self) {
        self.not_modified_responses_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("lattice-map/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });

        Self {
            roster: Arc::new(RwLock::new(RosterCache::default())),
            stats: Arc::new(RwLock::new(StatsCache::default())),
            http_client,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
