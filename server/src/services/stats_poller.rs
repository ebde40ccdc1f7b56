use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use lattice_shared::{NetworkStats, StatsEnvelope, flatten};
use tracing::{info, warn};

use crate::config::{api_base, stats_poll_interval_secs};
use crate::state::AppState;

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(stats_poll_interval_secs()));
    let base = api_base();

    loop {
        interval.tick().await;

        match fetch_stats(&state.http_client, &base).await {
            Ok(stats) => {
                state.observability.record_stats_poll_success();
                process_polled_stats(&state, stats).await;
            }
            Err(e) => {
                state.observability.record_stats_poll_failure();
                warn!("Failed to fetch stats: {e}");
                record_stats_error(&state, e).await;
            }
        }
    }
}

/// One upstream call, flattened into the record the dashboard renders.
/// No retry of its own; the interval loop is the retry policy.
async fn fetch_stats(client: &reqwest::Client, base: &str) -> Result<NetworkStats, String> {
    let url = format!("{base}/stats");
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read response body: {e}"))?;

    if !status.is_success() {
        return Err(format!(
            "upstream status {status}; body preview: {}",
            body_preview(&bytes)
        ));
    }

    let envelope: StatsEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
        format!(
            "failed to decode stats payload: {e}; body preview: {}",
            body_preview(&bytes)
        )
    })?;
    Ok(flatten(envelope.data))
}

fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).chars().take(200).collect()
}

/// Store a successful poll. The cache seq only advances when the flattened
/// record actually differs, so the stats ETag stays stable across polls that
/// return identical numbers.
async fn process_polled_stats(state: &AppState, stats: NetworkStats) {
    let unchanged = {
        let cache = state.stats.read().await;
        cache.stats.as_ref() == Some(&stats)
    };

    if unchanged {
        let mut cache = state.stats.write().await;
        cache.fetched_at = Some(Utc::now());
        cache.last_error = None;
        return;
    }

    let payload_json = match serde_json::to_vec(&stats) {
        Ok(json) => Arc::new(Bytes::from(json)),
        Err(e) => {
            warn!("failed to serialize stats payload: {e}");
            return;
        }
    };

    let mut cache = state.stats.write().await;
    cache.seq += 1;
    cache.stats = Some(stats);
    cache.payload_json = Some(payload_json);
    cache.fetched_at = Some(Utc::now());
    cache.last_error = None;
    info!(seq = cache.seq, "stats snapshot updated");
}

/// A failed poll records the error and nothing else: stale numbers keep
/// serving until the upstream recovers.
async fn record_stats_error(state: &AppState, error: String) {
    let mut cache = state.stats.write().await;
    cache.last_error = Some(error);
}
