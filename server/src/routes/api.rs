use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use lattice_shared::{CityOrder, parse_cities_body};
use tracing::warn;

use crate::config::{api_base, map_attribution, map_backdrop_url};
use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (member_count, roster_seq) = {
        let roster = state.roster.read().await;
        (roster.snapshot.members.len(), roster.snapshot.seq)
    };
    let (stats_available, stats_error) = {
        let stats = state.stats.read().await;
        (stats.stats.is_some(), stats.last_error.clone())
    };
    let observability = state.observability.snapshot();

    Json(serde_json::json!({
        "status": "ok",
        "consensus_members": member_count,
        "roster_seq": roster_seq,
        "stats_available": stats_available,
        "stats_error": stats_error,
        "observability": {
            "roster_poll_successes_total": observability.roster_poll_successes_total,
            "roster_poll_failures_total": observability.roster_poll_failures_total,
            "roster_changes_total": observability.roster_changes_total,
            "stats_poll_successes_total": observability.stats_poll_successes_total,
            "stats_poll_failures_total": observability.stats_poll_failures_total,
            "members_requests_total": observability.members_requests_total,
            "stats_requests_total": observability.stats_requests_total,
            "cities_proxy_requests_total": observability.cities_proxy_requests_total,
            "cities_proxy_upstream_errors_total": observability.cities_proxy_upstream_errors_total,
            "not_modified_responses_total": observability.not_modified_responses_total,
        }
    }))
}

/// Serve the pre-serialized roster snapshot. The ETag tracks the roster seq,
/// which only moves on a deep-value change, so quiet polls answer 304 and the
/// client knows its member list (and camera) can stay put.
pub async fn get_members(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.observability.record_members_request();
    let (etag, json): (String, Arc<Bytes>) = {
        let roster = state.roster.read().await;
        (
            roster_etag(roster.snapshot.seq),
            Arc::clone(&roster.payload_json),
        )
    };

    if if_none_match_matches(&headers, &etag) {
        state.observability.record_not_modified_response();
        return not_modified_response("public, max-age=5", Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), "public, max-age=5", Some(etag.as_str()))
}

/// Serve the latest flattened stats. Before the first successful poll the body
/// is JSON `null`: clients treat that as "not ready yet" rather than an error.
pub async fn get_stats(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.observability.record_stats_request();
    let (etag, json): (String, Option<Arc<Bytes>>) = {
        let stats = state.stats.read().await;
        (stats_etag(stats.seq), stats.payload_json.clone())
    };

    if if_none_match_matches(&headers, &etag) {
        state.observability.record_not_modified_response();
        return not_modified_response("public, max-age=5", Some(etag.as_str()));
    }

    let body = match json {
        Some(json) => (*json).clone(),
        None => Bytes::from_static(b"null"),
    };
    json_bytes_response(body, "public, max-age=5", Some(etag.as_str()))
}

#[derive(serde::Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub order: Option<String>,
}

/// Single-shot proxy for the upstream city rankings. No caching by design:
/// each call is one upstream GET, validated, reshaped to the bare array.
pub async fn get_cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Result<Response, StatusCode> {
    state.observability.record_cities_proxy_request();

    let order = query
        .order
        .as_deref()
        .and_then(CityOrder::from_query_value)
        .ok_or(StatusCode::BAD_REQUEST)?;

    let url = format!("{}/cities?order={}", api_base(), order.as_query_value());
    let resp = state.http_client.get(&url).send().await.map_err(|e| {
        state.observability.record_cities_proxy_upstream_error();
        warn!("cities proxy request failed: {e}");
        StatusCode::BAD_GATEWAY
    })?;

    if !resp.status().is_success() {
        state.observability.record_cities_proxy_upstream_error();
        warn!("cities proxy upstream status {}", resp.status());
        return Err(StatusCode::BAD_GATEWAY);
    }

    let body = resp.text().await.map_err(|e| {
        state.observability.record_cities_proxy_upstream_error();
        warn!("cities proxy body read failed: {e}");
        StatusCode::BAD_GATEWAY
    })?;

    let cities = parse_cities_body(&body).map_err(|e| {
        state.observability.record_cities_proxy_upstream_error();
        warn!("cities proxy payload rejected: {e}");
        StatusCode::BAD_GATEWAY
    })?;

    let json = serde_json::to_vec(&cities).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(json_bytes_response(Bytes::from(json), "no-store", None))
}

/// Injected map configuration. The backdrop URL (often carrying an embedded
/// API key) lives in deployment environment, never in client source.
pub async fn get_config() -> impl IntoResponse {
    let body = serde_json::json!({
        "backdrop_url": map_backdrop_url(),
        "attribution": map_attribution(),
    });
    (
        [(header::CACHE_CONTROL, "public, max-age=300")],
        Json(body),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (member_count, roster_seq) = {
        let roster = state.roster.read().await;
        (roster.snapshot.members.len(), roster.snapshot.seq)
    };
    let stats_available = state.stats.read().await.stats.is_some();
    let observability = state.observability.snapshot();

    let body = render_prometheus_metrics(member_count, roster_seq, stats_available, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    member_count: usize,
    roster_seq: u64,
    stats_available: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP lattice_consensus_members Current number of members in the cached roster."
    );
    let _ = writeln!(body, "# TYPE lattice_consensus_members gauge");
    let _ = writeln!(body, "lattice_consensus_members {member_count}");

    let _ = writeln!(
        body,
        "# HELP lattice_roster_seq Sequence number of the cached roster snapshot."
    );
    let _ = writeln!(body, "# TYPE lattice_roster_seq gauge");
    let _ = writeln!(body, "lattice_roster_seq {roster_seq}");

    let _ = writeln!(
        body,
        "# HELP lattice_stats_available Whether a stats snapshot has been fetched (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE lattice_stats_available gauge");
    let _ = writeln!(body, "lattice_stats_available {}", u8::from(stats_available));

    let _ = writeln!(
        body,
        "# HELP lattice_roster_poll_successes_total Total successful roster polls."
    );
    let _ = writeln!(body, "# TYPE lattice_roster_poll_successes_total counter");
    let _ = writeln!(
        body,
        "lattice_roster_poll_successes_total {}",
        observability.roster_poll_successes_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_roster_poll_failures_total Total failed roster polls."
    );
    let _ = writeln!(body, "# TYPE lattice_roster_poll_failures_total counter");
    let _ = writeln!(
        body,
        "lattice_roster_poll_failures_total {}",
        observability.roster_poll_failures_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_roster_changes_total Total polls that published a changed roster."
    );
    let _ = writeln!(body, "# TYPE lattice_roster_changes_total counter");
    let _ = writeln!(
        body,
        "lattice_roster_changes_total {}",
        observability.roster_changes_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_stats_poll_successes_total Total successful stats polls."
    );
    let _ = writeln!(body, "# TYPE lattice_stats_poll_successes_total counter");
    let _ = writeln!(
        body,
        "lattice_stats_poll_successes_total {}",
        observability.stats_poll_successes_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_stats_poll_failures_total Total failed stats polls."
    );
    let _ = writeln!(body, "# TYPE lattice_stats_poll_failures_total counter");
    let _ = writeln!(
        body,
        "lattice_stats_poll_failures_total {}",
        observability.stats_poll_failures_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_members_requests_total Total /api/members requests."
    );
    let _ = writeln!(body, "# TYPE lattice_members_requests_total counter");
    let _ = writeln!(
        body,
        "lattice_members_requests_total {}",
        observability.members_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_stats_requests_total Total /api/stats requests."
    );
    let _ = writeln!(body, "# TYPE lattice_stats_requests_total counter");
    let _ = writeln!(
        body,
        "lattice_stats_requests_total {}",
        observability.stats_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_cities_proxy_requests_total Total /api/cities proxy requests."
    );
    let _ = writeln!(body, "# TYPE lattice_cities_proxy_requests_total counter");
    let _ = writeln!(
        body,
        "lattice_cities_proxy_requests_total {}",
        observability.cities_proxy_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_cities_proxy_upstream_errors_total Total upstream failures behind /api/cities."
    );
    let _ = writeln!(
        body,
        "# TYPE lattice_cities_proxy_upstream_errors_total counter"
    );
    let _ = writeln!(
        body,
        "lattice_cities_proxy_upstream_errors_total {}",
        observability.cities_proxy_upstream_errors_total
    );

    let _ = writeln!(
        body,
        "# HELP lattice_not_modified_responses_total Total conditional requests answered 304."
    );
    let _ = writeln!(body, "# TYPE lattice_not_modified_responses_total counter");
    let _ = writeln!(
        body,
        "lattice_not_modified_responses_total {}",
        observability.not_modified_responses_total
    );

    body
}

fn roster_etag(seq: u64) -> String {
    format!("\"roster-{seq}\"")
}

fn stats_etag(seq: u64) -> String {
    format!("\"stats-{seq}\"")
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::Router;
    use axum::http::StatusCode as AxumStatusCode;
    use axum::routing::get;
    use bytes::Bytes;
    use chrono::Utc;

    use super::{if_none_match_matches, render_prometheus_metrics};
    use crate::state::{AppState, ObservabilitySnapshot};
    use lattice_shared::{ConsensusMember, RosterSnapshot};

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    async fn spawn_stub_upstream(app: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub upstream");
        });
        (format!("http://{addr}"), handle)
    }

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

    async fn seed_roster(state: &AppState, seq: u64, members: Vec<ConsensusMember>) {
        let snapshot = RosterSnapshot {
            seq,
            timestamp: Utc::now(),
            members,
        };
        let payload = serde_json::to_vec(&snapshot).expect("serialize test roster");
        let mut cache = state.roster.write().await;
        cache.snapshot = snapshot;
        cache.payload_json = Arc::new(Bytes::from(payload));
    }

    #[test]
    fn metrics_output_contains_prometheus_help_type_and_values() {
        let observability = ObservabilitySnapshot {
            roster_poll_successes_total: 12,
            roster_poll_failures_total: 2,
            roster_changes_total: 4,
            stats_poll_successes_total: 11,
            stats_poll_failures_total: 1,
            members_requests_total: 40,
            stats_requests_total: 39,
            cities_proxy_requests_total: 6,
            cities_proxy_upstream_errors_total: 3,
            not_modified_responses_total: 25,
        };

        let metrics = render_prometheus_metrics(16, 7, true, observability);

        assert!(metrics.contains("# HELP lattice_consensus_members"));
        assert!(metrics.contains("# TYPE lattice_roster_poll_successes_total counter"));
        assert!(metrics.contains("lattice_consensus_members 16"));
        assert!(metrics.contains("lattice_roster_seq 7"));
        assert!(metrics.contains("lattice_stats_available 1"));
        assert!(metrics.contains("lattice_roster_poll_successes_total 12"));
        assert!(metrics.contains("lattice_roster_poll_failures_total 2"));
        assert!(metrics.contains("lattice_roster_changes_total 4"));
        assert!(metrics.contains("lattice_stats_poll_successes_total 11"));
        assert!(metrics.contains("lattice_stats_poll_failures_total 1"));
        assert!(metrics.contains("lattice_members_requests_total 40"));
        assert!(metrics.contains("lattice_stats_requests_total 39"));
        assert!(metrics.contains("lattice_cities_proxy_requests_total 6"));
        assert!(metrics.contains("lattice_cities_proxy_upstream_errors_total 3"));
        assert!(metrics.contains("lattice_not_modified_responses_total 25"));
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"roster-42\""),
        );
        assert!(if_none_match_matches(&headers, "\"roster-42\""));
    }

    #[tokio::test]
    async fn members_endpoint_returns_not_modified_when_etag_matches() {
        let state = AppState::new();
        seed_roster(&state, 9, vec![member("11aaa", 8.54, 47.37)]).await;

        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/members"))
            .send()
            .await
            .expect("members request should succeed");
        let first_status = first.status();
        let first_etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");
        let body: serde_json::Value = first.json().await.expect("parse members body");

        assert_eq!(first_status, reqwest::StatusCode::OK);
        assert_eq!(first_etag, "\"roster-9\"");
        assert_eq!(body["seq"], 9);
        assert_eq!(body["members"][0]["address"], "11aaa");

        let second = client
            .get(format!("{base_url}/api/members"))
            .header(reqwest::header::IF_NONE_MATCH, first_etag)
            .send()
            .await
            .expect("conditional members request should succeed");

        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);
        assert_eq!(
            second
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("public, max-age=5")
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn stats_endpoint_serves_null_until_first_poll() {
        let state = AppState::new();
        let (addr, server_handle) = spawn_test_server(state).await;

        let body = reqwest::Client::new()
            .get(format!("http://{addr}/api/stats"))
            .send()
            .await
            .expect("stats request")
            .error_for_status()
            .expect("stats status")
            .text()
            .await
            .expect("stats body");

        assert_eq!(body, "null");

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn stats_endpoint_serves_cached_payload_with_etag() {
        let state = AppState::new();
        {
            let mut cache = state.stats.write().await;
            cache.seq = 3;
            cache.payload_json = Some(Arc::new(Bytes::from_static(
                br#"{"circulating_supply":1.0}"#,
            )));
        }

        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        let first = client
            .get(format!("http://{addr}/api/stats"))
            .send()
            .await
            .expect("stats request");
        assert_eq!(
            first
                .headers()
                .get(reqwest::header::ETAG)
                .and_then(|v| v.to_str().ok()),
            Some("\"stats-3\"")
        );

        let second = client
            .get(format!("http://{addr}/api/stats"))
            .header(reqwest::header::IF_NONE_MATCH, "\"stats-3\"")
            .send()
            .await
            .expect("conditional stats request");
        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn cities_endpoint_rejects_unknown_order_values() {
        let state = AppState::new();
        let (addr, server_handle) = spawn_test_server(state).await;
        let client = reqwest::Client::new();

        for bad in ["name", "", "ONLINE_COUNT"] {
            let resp = client
                .get(format!("http://{addr}/api/cities?order={bad}"))
                .send()
                .await
                .expect("cities request");
            assert_eq!(
                resp.status(),
                reqwest::StatusCode::BAD_REQUEST,
                "order={bad:?} must be rejected"
            );
        }

        let missing = client
            .get(format!("http://{addr}/api/cities"))
            .send()
            .await
            .expect("cities request");
        assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn cities_endpoint_proxies_the_selected_order() {
        let stub = Router::new().route(
            "/cities",
            get(
                |axum::extract::Query(q): axum::extract::Query<
                    std::collections::HashMap<String, String>,
                >| async move {
                    assert_eq!(q.get("order").map(String::as_str), Some("online_count"));
                    axum::Json(serde_json::json!({
                        "data": [
                            {"city_id": "enVyaWNo", "long_city": "Zurich",
                             "hotspot_count": 12, "online_count": 11}
                        ]
                    }))
                },
            ),
        );
        let (upstream_base, upstream_handle) = spawn_stub_upstream(stub).await;

        temp_env::async_with_vars([("LATTICE_API_BASE", Some(upstream_base))], async {
            let state = AppState::new();
            let (addr, server_handle) = spawn_test_server(state).await;

            let cities: serde_json::Value = reqwest::Client::new()
                .get(format!("http://{addr}/api/cities?order=online_count"))
                .send()
                .await
                .expect("cities request")
                .error_for_status()
                .expect("cities status")
                .json()
                .await
                .expect("cities body");

            assert!(cities.is_array());
            assert_eq!(cities[0]["long_city"], "Zurich");
            assert_eq!(cities[0]["online_count"], 11);

            server_handle.abort();
            let _ = server_handle.await;
        })
        .await;

        upstream_handle.abort();
    }

    #[tokio::test]
    async fn cities_endpoint_maps_upstream_failure_to_bad_gateway() {
        let stub = Router::new().route(
            "/cities",
            get(|| async { (AxumStatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let (upstream_base, upstream_handle) = spawn_stub_upstream(stub).await;

        temp_env::async_with_vars([("LATTICE_API_BASE", Some(upstream_base))], async {
            let state = AppState::new();
            let (addr, server_handle) = spawn_test_server(state).await;

            let resp = reqwest::Client::new()
                .get(format!("http://{addr}/api/cities?order=hotspot_count"))
                .send()
                .await
                .expect("cities request");
            assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);

            server_handle.abort();
            let _ = server_handle.await;
        })
        .await;

        upstream_handle.abort();
    }

    #[tokio::test]
    async fn config_endpoint_reflects_injected_backdrop() {
        temp_env::async_with_vars(
            [
                ("MAP_BACKDROP_URL", Some("https://tiles.test/world.png")),
                ("MAP_ATTRIBUTION", Some("Tiles by tiles.test")),
            ],
            async {
                let state = AppState::new();
                let (addr, server_handle) = spawn_test_server(state).await;

                let config: serde_json::Value = reqwest::Client::new()
                    .get(format!("http://{addr}/api/config"))
                    .send()
                    .await
                    .expect("config request")
                    .error_for_status()
                    .expect("config status")
                    .json()
                    .await
                    .expect("config body");

                assert_eq!(config["backdrop_url"], "https://tiles.test/world.png");
                assert_eq!(config["attribution"], "Tiles by tiles.test");

                server_handle.abort();
                let _ = server_handle.await;
            },
        )
        .await;
    }

    #[tokio::test]
    async fn health_and_metrics_expose_expected_contract() {
        let state = AppState::new();
        seed_roster(
            &state,
            2,
            vec![member("11aaa", 1.0, 2.0), member("11bbb", 3.0, 4.0)],
        )
        .await;

        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        client
            .get(format!("{base_url}/api/members"))
            .send()
            .await
            .expect("members request")
            .error_for_status()
            .expect("members status");

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert_eq!(
            health.get("consensus_members").and_then(|v| v.as_u64()),
            Some(2)
        );
        assert_eq!(health.get("roster_seq").and_then(|v| v.as_u64()), Some(2));
        assert_eq!(
            health.get("stats_available").and_then(|v| v.as_bool()),
            Some(false)
        );
        assert!(
            health
                .get("observability")
                .and_then(|v| v.get("members_requests_total"))
                .and_then(|v| v.as_u64())
                .is_some()
        );

        let metrics = client
            .get(format!("{base_url}/api/metrics"))
            .send()
            .await
            .expect("metrics request")
            .error_for_status()
            .expect("metrics status")
            .text()
            .await
            .expect("parse metrics text");

        assert!(metrics.contains("# TYPE lattice_members_requests_total counter"));
        assert!(metrics.contains("lattice_consensus_members 2"));
        assert!(metrics.contains("lattice_members_requests_total 1"));
        assert!(metrics.contains("lattice_stats_available 0"));

        server_handle.abort();
        let _ = server_handle.await;
    }
}
