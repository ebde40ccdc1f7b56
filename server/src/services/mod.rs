pub mod roster_poller;
pub mod stats_poller;
