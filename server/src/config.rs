use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.lattice.network/v1";

pub const STATS_POLL_INTERVAL_SECS: u64 = 10;
pub const ROSTER_POLL_INTERVAL_SECS: u64 = 10;

pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const SERVER_PORT: u16 = 3000;

/// Upstream API base, without a trailing slash. `LATTICE_API_BASE` overrides
/// the default so staging deployments can point at a mirror.
pub fn api_base() -> String {
    std::env::var("LATTICE_API_BASE")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Map backdrop image URL handed to clients via `/api/config`. There is no
/// baked-in default: styles with embedded API keys are deployment
/// configuration, never source. `None` makes the client draw its plain
/// graticule backdrop.
pub fn map_backdrop_url() -> Option<String> {
    std::env::var("MAP_BACKDROP_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Attribution line shown on the map when the backdrop requires one.
pub fn map_attribution() -> Option<String> {
    std::env::var("MAP_ATTRIBUTION")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(SERVER_PORT)
}

pub fn stats_poll_interval_secs() -> u64 {
    std::env::var("STATS_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(STATS_POLL_INTERVAL_SECS)
}

pub fn roster_poll_interval_secs() -> u64 {
    std::env::var("ROSTER_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(ROSTER_POLL_INTERVAL_SECS)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_falls_back_to_default() {
        temp_env::with_var("LATTICE_API_BASE", None::<&str>, || {
            assert_eq!(api_base(), DEFAULT_API_BASE);
        });
    }

    #[test]
    fn api_base_strips_whitespace_and_trailing_slash() {
        temp_env::with_var("LATTICE_API_BASE", Some(" https://mirror.test/v1/ "), || {
            assert_eq!(api_base(), "https://mirror.test/v1");
        });
    }

    #[test]
    fn empty_api_base_override_is_ignored() {
        temp_env::with_var("LATTICE_API_BASE", Some("   "), || {
            assert_eq!(api_base(), DEFAULT_API_BASE);
        });
    }

    #[test]
    fn backdrop_url_defaults_to_none() {
        temp_env::with_var("MAP_BACKDROP_URL", None::<&str>, || {
            assert_eq!(map_backdrop_url(), None);
        });
    }

    #[test]
    fn backdrop_url_passes_through_when_set() {
        temp_env::with_var(
            "MAP_BACKDROP_URL",
            Some("https://tiles.test/world.png"),
            || {
                assert_eq!(
                    map_backdrop_url().as_deref(),
                    Some("https://tiles.test/world.png")
                );
            },
        );
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        temp_env::with_var("STATS_POLL_INTERVAL_SECS", Some("0"), || {
            assert_eq!(stats_poll_interval_secs(), STATS_POLL_INTERVAL_SECS);
        });
    }

    #[test]
    fn poll_interval_override_applies() {
        temp_env::with_var("ROSTER_POLL_INTERVAL_SECS", Some("30"), || {
            assert_eq!(roster_poll_interval_secs(), 30);
        });
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        temp_env::with_var("PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), SERVER_PORT);
        });
    }
}
