use serde::{Deserialize, Serialize};

/// Raw upstream `/stats` payload. Mirrors the wire shape; only the fields the
/// dashboard consumes are named, everything else is ignored on parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub token_supply: f64,
    #[serde(default)]
    pub block_times: WindowedAverages,
    #[serde(default)]
    pub election_times: WindowedAverages,
    #[serde(default)]
    pub counts: GlobalCounts,
    #[serde(default)]
    pub state_channel_counts: TransferCounts,
}

/// `{ "data": … }` envelope the upstream wraps every payload in.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsEnvelope {
    pub data: StatsPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowedAverages {
    #[serde(default)]
    pub last_hour: WindowStats,
    #[serde(default)]
    pub last_day: WindowStats,
    #[serde(default)]
    pub last_week: WindowStats,
    #[serde(default)]
    pub last_month: WindowStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub stddev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalCounts {
    #[serde(default)]
    pub challenges: u64,
    #[serde(default)]
    pub consensus_groups: u64,
    #[serde(default)]
    pub hotspots: u64,
    #[serde(default)]
    pub blocks: u64,
    #[serde(default)]
    pub cities: u64,
    #[serde(default)]
    pub countries: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransferCounts {
    #[serde(default)]
    pub last_month: TransferWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransferWindow {
    #[serde(default)]
    pub num_packets: u64,
    #[serde(default)]
    pub num_dcs: u64,
}

/// Flat record the dashboard renders. Refetched wholesale on every poll; no
/// identity, no partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub circulating_supply: f64,
    /// Daily average, seconds. The full window set stays available in
    /// `block_times` for the detail tiles.
    pub block_time: f64,
    pub block_times: WindowedAverages,
    pub challenges: u64,
    pub consensus_groups: u64,
    /// Daily average, seconds.
    pub election_time: f64,
    pub election_times: WindowedAverages,
    pub packets_transferred: u64,
    pub data_credits: u64,
    pub total_hotspots: u64,
    pub total_blocks: u64,
    pub total_cities: u64,
    pub total_countries: u64,
}

/// Reshape the nested upstream payload into the flat dashboard record.
pub fn flatten(payload: StatsPayload) -> NetworkStats {
    NetworkStats {
        circulating_supply: payload.token_supply,
        block_time: payload.block_times.last_day.avg,
        block_times: payload.block_times,
        challenges: payload.counts.challenges,
        consensus_groups: payload.counts.consensus_groups,
        election_time: payload.election_times.last_day.avg,
        election_times: payload.election_times,
        packets_transferred: payload.state_channel_counts.last_month.num_packets,
        data_credits: payload.state_channel_counts.last_month.num_dcs,
        total_hotspots: payload.counts.hotspots,
        total_blocks: payload.counts.blocks,
        total_cities: payload.counts.cities,
        total_countries: payload.counts.countries,
    }
}
