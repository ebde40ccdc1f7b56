use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use lattice_shared::{ConsensusMember, RosterSnapshot, members_changed};
use tracing::{info, warn};

use crate::config::{api_base, roster_poll_interval_secs};
use crate::state::AppState;

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(roster_poll_interval_secs()));
    let base = api_base();

    loop {
        interval.tick().await;

        match fetch_roster(&state.http_client, &base).await {
            Ok(members) => {
                state.observability.record_roster_poll_success();
                process_polled_roster(&state, members).await;
            }
            Err(e) => {
                state.observability.record_roster_poll_failure();
                warn!("Failed to fetch consensus roster: {e}");
            }
        }
    }
}

async fn fetch_roster(
    client: &reqwest::Client,
    base: &str,
) -> Result<Vec<ConsensusMember>, String> {
    let url = format!("{base}/hotspots/elected");
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

    parse_roster_payload(bytes.as_ref()).map_err(|e| {
        format!(
            "failed to decode roster payload: {e}; body preview: {}",
            body_preview(&bytes)
        )
    })
}

fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).chars().take(200).collect()
}

#[derive(serde::Deserialize)]
struct RosterEnvelope {
    data: Vec<ConsensusMember>,
}

/// Records with a blank address carry no identity and are dropped; everything
/// else passes through, coordinates present or not.
fn parse_roster_payload(bytes: &[u8]) -> Result<Vec<ConsensusMember>, serde_json::Error> {
    let envelope: RosterEnvelope = serde_json::from_slice(bytes)?;
    Ok(envelope
        .data
        .into_iter()
        .filter(|m| !m.address.trim().is_empty())
        .collect())
}

/// Publish a polled roster. The seq, payload bytes and therefore the ETag
/// move only when the member list differs by value from the cached one — a
/// poll that returns the same group is a no-op and clients keep their camera.
async fn process_polled_roster(state: &AppState, members: Vec<ConsensusMember>) {
    let (changed, next_seq) = {
        let cache = state.roster.read().await;
        (
            members_changed(&cache.snapshot.members, &members),
            cache.snapshot.seq + 1,
        )
    };

    if !changed {
        return;
    }

    let snapshot = RosterSnapshot {
        seq: next_seq,
        timestamp: Utc::now(),
        members,
    };
    let payload_json = match serde_json::to_vec(&snapshot) {
        Ok(json) => Arc::new(Bytes::from(json)),
        Err(e) => {
            warn!("failed to serialize roster snapshot: {e}");
            return;
        }
    };

    let member_count = snapshot.members.len();
    {
        let mut cache = state.roster.write().await;
        cache.snapshot = snapshot;
        cache.payload_json = payload_json;
    }
    state.observability.record_roster_change();
    info!(seq = next_seq, member_count, "consensus roster changed");
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::{fetch_roster, parse_roster_payload, process_polled_roster};
    use crate::state::AppState;
    use lattice_shared::ConsensusMember;

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

    async fn spawn_upstream(app: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub upstream");
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn first_roster_bumps_seq_and_publishes_payload() {
        let state = AppState::new();

        process_polled_roster(&state, vec![member("a", 1.0, 2.0)]).await;

        let cache = state.roster.read().await;
        assert_eq!(cache.snapshot.seq, 1);
        assert_eq!(cache.snapshot.members.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&cache.payload_json).unwrap();
        assert_eq!(body["seq"], 1);
        assert_eq!(body["members"][0]["address"], "a");
    }

    #[tokio::test]
    async fn deep_equal_roster_is_a_noop_tick() {
        let state = AppState::new();
        process_polled_roster(&state, vec![member("a", 1.0, 2.0), member("b", 3.0, 4.0)]).await;

        let payload_before = Arc::clone(&state.roster.read().await.payload_json);

        // Fresh allocation, same values: what every quiet poll produces.
        process_polled_roster(&state, vec![member("a", 1.0, 2.0), member("b", 3.0, 4.0)]).await;

        let cache = state.roster.read().await;
        assert_eq!(cache.snapshot.seq, 1);
        assert!(
            Arc::ptr_eq(&payload_before, &cache.payload_json),
            "payload bytes must not be rebuilt on a no-op tick"
        );
    }

    #[tokio::test]
    async fn changed_roster_bumps_seq_exactly_once() {
        let state = AppState::new();
        process_polled_roster(&state, vec![member("a", 1.0, 2.0)]).await;
        process_polled_roster(&state, vec![member("a", 1.0, 2.0), member("c", 9.0, 9.0)]).await;

        let cache = state.roster.read().await;
        assert_eq!(cache.snapshot.seq, 2);
        assert_eq!(cache.snapshot.members.len(), 2);
        assert_eq!(state.observability.snapshot().roster_changes_total, 2);
    }

    #[test]
    fn parse_roster_tolerates_missing_fields_and_drops_blank_addresses() {
        let payload = r#"{"data":[
            {"address":"11aaa","lng":8.54,"lat":47.37,"geocode":{"short_country":"CH"}},
            {"address":"","lng":1.0,"lat":1.0},
            {"address":"11bbb"}
        ]}"#;

        let members = parse_roster_payload(payload.as_bytes()).expect("payload should parse");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].address, "11aaa");
        assert_eq!(members[0].geocode.short_country.as_deref(), Some("CH"));
        assert_eq!(members[1].address, "11bbb");
        assert_eq!(members[1].lng, None);
    }

    #[test]
    fn parse_roster_rejects_envelope_without_data() {
        assert!(parse_roster_payload(br#"{"members":[]}"#).is_err());
    }

    #[tokio::test]
    async fn fetch_roster_parses_a_stub_upstream() {
        let app = Router::new().route(
            "/hotspots/elected",
            get(|| async {
                axum::Json(serde_json::json!({
                    "data": [
                        {"address": "11aaa", "lng": -73.97, "lat": 40.77,
                         "geocode": {"short_country": "US"}}
                    ]
                }))
            }),
        );
        let (base, handle) = spawn_upstream(app).await;

        let client = reqwest::Client::new();
        let members = fetch_roster(&client, &base).await.expect("fetch should succeed");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].address, "11aaa");

        handle.abort();
    }

    #[tokio::test]
    async fn fetch_roster_surfaces_upstream_errors() {
        let app = Router::new().route(
            "/hotspots/elected",
            get(|| async { (StatusCode::BAD_GATEWAY, "mirror down") }),
        );
        let (base, handle) = spawn_upstream(app).await;

        let client = reqwest::Client::new();
        let err = fetch_roster(&client, &base).await.expect_err("should fail");
        assert!(err.contains("upstream status 502"), "got: {err}");

        handle.abort();
    }
}
