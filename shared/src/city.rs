use serde::{Deserialize, Serialize};

/// City ranking record. The dashboard names the handful of fields it renders;
/// everything else the upstream sends is carried in `extra` so the record
/// round-trips without this crate having to chase upstream schema additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city_id: String,
    #[serde(default)]
    pub long_city: Option<String>,
    #[serde(default)]
    pub short_city: Option<String>,
    #[serde(default)]
    pub long_country: Option<String>,
    #[serde(default)]
    pub short_country: Option<String>,
    #[serde(default)]
    pub hotspot_count: u64,
    #[serde(default)]
    pub online_count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitiesEnvelope {
    pub data: Vec<City>,
}

/// Sort order accepted by the upstream `/cities` endpoint. Anything else is
/// rejected before a proxy request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityOrder {
    OnlineCount,
    HotspotCount,
}

impl CityOrder {
    pub const fn as_query_value(self) -> &'static str {
        match self {
            CityOrder::OnlineCount => "online_count",
            CityOrder::HotspotCount => "hotspot_count",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "online_count" => Some(CityOrder::OnlineCount),
            "hotspot_count" => Some(CityOrder::HotspotCount),
            _ => None,
        }
    }
}

/// Extract the `data` array from a cities response body. The returned records
/// are owned values fully decoupled from the body they were parsed out of.
pub fn parse_cities_body(body: &str) -> Result<Vec<City>, String> {
    let envelope: CitiesEnvelope =
        serde_json::from_str(body).map_err(|e| format!("invalid cities payload: {e}"))?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::{CityOrder, parse_cities_body};

    #[test]
    fn parses_data_field_into_owned_records() {
        let body = r#"{"data":[
            {"city_id":"enVyaWNo","long_city":"Zurich","short_country":"CH",
             "hotspot_count":120,"online_count":98},
            {"city_id":"bGlzYm9u","long_city":"Lisbon","short_country":"PT",
             "hotspot_count":80,"online_count":80}
        ]}"#;

        let cities = parse_cities_body(body).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].long_city.as_deref(), Some("Zurich"));
        assert_eq!(cities[0].online_count, 98);
        assert_eq!(cities[1].hotspot_count, 80);
    }

    #[test]
    fn two_parses_of_the_same_body_are_value_equal() {
        let body = r#"{"data":[{"city_id":"a","hotspot_count":1,"online_count":1}]}"#;
        assert_eq!(
            parse_cities_body(body).unwrap(),
            parse_cities_body(body).unwrap()
        );
    }

    #[test]
    fn unnamed_fields_round_trip_through_extra() {
        let body = r#"{"data":[{"city_id":"a","offline_count":7,"long_state":"Aargau"}]}"#;
        let cities = parse_cities_body(body).unwrap();

        let back = serde_json::to_value(&cities[0]).unwrap();
        assert_eq!(back["offline_count"], 7);
        assert_eq!(back["long_state"], "Aargau");
    }

    #[test]
    fn missing_data_field_is_an_error_not_a_panic() {
        let err = parse_cities_body(r#"{"cities":[]}"#).unwrap_err();
        assert!(err.contains("invalid cities payload"));
    }

    #[test]
    fn order_query_values_match_the_upstream_contract() {
        assert_eq!(CityOrder::OnlineCount.as_query_value(), "online_count");
        assert_eq!(CityOrder::HotspotCount.as_query_value(), "hotspot_count");
        assert_eq!(
            CityOrder::from_query_value("online_count"),
            Some(CityOrder::OnlineCount)
        );
        assert_eq!(
            CityOrder::from_query_value("hotspot_count"),
            Some(CityOrder::HotspotCount)
        );
        assert_eq!(CityOrder::from_query_value("name"), None);
    }
}
