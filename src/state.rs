//! Latest-known measurement state shared between the poll workers and the
//! snapshot loop.
//!
//! The table is partitioned by owner: each worker replaces only its own field
//! group, whole, while holding the single lock, so a reader can never observe
//! a half-written batch. Field groups from different workers may reflect
//! different wall-clock instants; the snapshot loop tolerates that staleness
//! by design.

use parking_lot::Mutex;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Placeholder location until the operator types the first label.
pub const INITIAL_LOCATION: &str = "Initializing...";

/// Radio fields owned by the WiFi worker.
#[derive(Debug, Clone, Default)]
pub struct WifiFields {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub channel: Option<u32>,
    pub channel_band: Option<String>,
    pub channel_width: Option<String>,
    pub phy_mode: Option<String>,
    pub auth_mode: Option<String>,
    pub country_code: Option<String>,
    pub nic_mac: Option<String>,
    pub rssi_dbm: Option<i64>,
    pub noise_dbm: Option<i64>,
    pub tx_rate_mbps: Option<f64>,
}

/// Interface addressing, refreshed by the WiFi worker on a slower cadence.
/// The gateway IP doubles as the resolution source for the symbolic LAN
/// ping target.
#[derive(Debug, Clone, Default)]
pub struct LinkFields {
    pub nic_ip: Option<String>,
    pub gateway_ip: Option<String>,
}

/// Latency fields owned by one ICMP worker (one instance per target).
#[derive(Debug, Clone, Default)]
pub struct PingFields {
    pub avg_ms: Option<u32>,
    pub loss_pct: Option<u32>,
    pub count: Option<u32>,
}

impl PingFields {
    /// Failure marker: the probe ran (or timed out) and delivered nothing.
    pub fn lost_all(count: u32) -> Self {
        Self { avg_ms: None, loss_pct: Some(100), count: Some(count) }
    }
}

/// Throughput fields owned by the iperf worker. Directions fail
/// independently, so each is updated on its own.
#[derive(Debug, Clone, Default)]
pub struct ThroughputFields {
    pub rx_mbps: Option<f64>,
    pub tx_mbps: Option<f64>,
    pub rx_mbytes: Option<f64>,
    pub tx_mbytes: Option<f64>,
}

/// The whole latest-known table. Cloned as one unit by the snapshot loop.
#[derive(Debug, Clone)]
pub struct SharedState {
    pub location: String,
    pub wifi: WifiFields,
    pub link: LinkFields,
    pub icmp_lan: PingFields,
    pub icmp_wan: PingFields,
    pub throughput: ThroughputFields,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            location: INITIAL_LOCATION.to_string(),
            wifi: WifiFields::default(),
            link: LinkFields::default(),
            icmp_lan: PingFields::default(),
            icmp_wan: PingFields::default(),
            throughput: ThroughputFields::default(),
        }
    }
}

pub type SurveyState = Shared<SharedState>;
