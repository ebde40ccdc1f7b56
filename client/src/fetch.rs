use serde::Deserialize;

use lattice_shared::{City, CityOrder, NetworkStats, RosterSnapshot};

/// Deployment-injected map configuration served by `/api/config`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Equirectangular backdrop image URL. `None` means no backdrop is
    /// configured and the map draws its built-in graticule instead.
    pub backdrop_url: Option<String>,
    pub attribution: Option<String>,
}

/// Fetch the current consensus roster.
pub async fn fetch_members() -> Result<RosterSnapshot, String> {
    let resp = gloo_net::http::Request::get("/api/members")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<RosterSnapshot>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch flattened network statistics. `Ok(None)` means the server answered
/// but has not completed its first upstream poll yet; callers keep showing
/// their loading state rather than an error.
pub async fn fetch_stats() -> Result<Option<NetworkStats>, String> {
    let resp = gloo_net::http::Request::get("/api/stats")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Option<NetworkStats>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch the city ranking in the given order. Single-shot: every call issues
/// a fresh request and parses a fresh, fully owned record list.
pub async fn fetch_cities(order: CityOrder) -> Result<Vec<City>, String> {
    let url = format!("/api/cities?order={}", order.as_query_value());
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<City>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

pub async fn fetch_cities_by_online() -> Result<Vec<City>, String> {
    fetch_cities(CityOrder::OnlineCount).await
}

pub async fn fetch_cities_by_total() -> Result<Vec<City>, String> {
    fetch_cities(CityOrder::HotspotCount).await
}

pub async fn fetch_map_config() -> Result<MapConfig, String> {
    let resp = gloo_net::http::Request::get("/api/config")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<MapConfig>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}
