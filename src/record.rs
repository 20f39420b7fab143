//! The immutable measurement record.
//!
//! One `Record` is written per snapshot tick and never touched again. Field
//! order and the full field set are part of the schema contract: serde emits
//! struct fields in declaration order, and unknown values serialize as
//! `null`, never as absent keys, so every log line has the same shape.

use crate::state::SharedState;
use serde::{Deserialize, Serialize};

/// Schema field names in the exact order they appear on every log line.
/// Kept in lockstep with the struct declaration; the CSV exporter and the
/// schema test both consume this list.
pub const FIELD_NAMES: &[&str] = &[
    "epoch",
    "timestamp",
    "location",
    "country_code",
    "ssid",
    "bssid",
    "bss_transition",
    "nic_mac",
    "nic_ip",
    "nic_gw_ip",
    "auth_mode",
    "phy_mode",
    "channel",
    "channel_band",
    "channel_width",
    "tx_rate_mbps",
    "rssi_dbm",
    "noise_dbm",
    "snr",
    "iperf_rx_mbps",
    "iperf_tx_mbps",
    "iperf_rx_mbytes",
    "iperf_tx_mbytes",
    "icmp_lan_count",
    "icmp_lan_ms",
    "icmp_lan_lost",
    "icmp_wan_count",
    "icmp_wan_ms",
    "icmp_wan_lost",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub epoch: i64,
    pub timestamp: String,
    pub location: String,
    pub country_code: Option<String>,
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub bss_transition: u8,
    pub nic_mac: Option<String>,
    pub nic_ip: Option<String>,
    pub nic_gw_ip: Option<String>,
    pub auth_mode: Option<String>,
    pub phy_mode: Option<String>,
    pub channel: Option<u32>,
    pub channel_band: Option<String>,
    pub channel_width: Option<String>,
    pub tx_rate_mbps: Option<f64>,
    pub rssi_dbm: Option<i64>,
    pub noise_dbm: Option<i64>,
    pub snr: i64,
    pub iperf_rx_mbps: Option<f64>,
    pub iperf_tx_mbps: Option<f64>,
    pub iperf_rx_mbytes: Option<f64>,
    pub iperf_tx_mbytes: Option<f64>,
    pub icmp_lan_count: Option<u32>,
    pub icmp_lan_ms: Option<u32>,
    pub icmp_lan_lost: Option<u32>,
    pub icmp_wan_count: Option<u32>,
    pub icmp_wan_ms: Option<u32>,
    pub icmp_wan_lost: Option<u32>,
}

/// A roam needs both sides known and different. The first tick, and any tick
/// where either side is unknown, never counts.
pub fn roam_detected(previous: Option<&str>, current: Option<&str>) -> bool {
    matches!((previous, current), (Some(p), Some(c)) if p != c)
}

/// RSSI minus noise floor when both are known; 0 otherwise.
pub fn snr(rssi_dbm: Option<i64>, noise_dbm: Option<i64>) -> i64 {
    match (rssi_dbm, noise_dbm) {
        (Some(rssi), Some(noise)) => rssi - noise,
        _ => 0,
    }
}

impl Record {
    /// Assemble a record from one consistent state snapshot plus the derived
    /// computations that only the snapshot loop can make.
    pub fn build(
        snapshot: &SharedState,
        epoch: i64,
        timestamp: String,
        previous_bssid: Option<&str>,
    ) -> Self {
        let wifi = &snapshot.wifi;
        Record {
            epoch,
            timestamp,
            location: snapshot.location.clone(),
            country_code: wifi.country_code.clone(),
            ssid: wifi.ssid.clone(),
            bssid: wifi.bssid.clone(),
            bss_transition: u8::from(roam_detected(previous_bssid, wifi.bssid.as_deref())),
            nic_mac: wifi.nic_mac.clone(),
            nic_ip: snapshot.link.nic_ip.clone(),
            nic_gw_ip: snapshot.link.gateway_ip.clone(),
            auth_mode: wifi.auth_mode.clone(),
            phy_mode: wifi.phy_mode.clone(),
            channel: wifi.channel,
            channel_band: wifi.channel_band.clone(),
            channel_width: wifi.channel_width.clone(),
            tx_rate_mbps: wifi.tx_rate_mbps,
            rssi_dbm: wifi.rssi_dbm,
            noise_dbm: wifi.noise_dbm,
            snr: snr(wifi.rssi_dbm, wifi.noise_dbm),
            iperf_rx_mbps: snapshot.throughput.rx_mbps,
            iperf_tx_mbps: snapshot.throughput.tx_mbps,
            iperf_rx_mbytes: snapshot.throughput.rx_mbytes,
            iperf_tx_mbytes: snapshot.throughput.tx_mbytes,
            icmp_lan_count: snapshot.icmp_lan.count,
            icmp_lan_ms: snapshot.icmp_lan.avg_ms,
            icmp_lan_lost: snapshot.icmp_lan.loss_pct,
            icmp_wan_count: snapshot.icmp_wan.count,
            icmp_wan_ms: snapshot.icmp_wan.avg_ms,
            icmp_wan_lost: snapshot.icmp_wan.loss_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedState;

    fn empty_record() -> Record {
        Record::build(&SharedState::default(), 1700000000, "2023-11-14 23:13:20".into(), None)
    }

    #[test]
    fn serializes_all_fields_in_schema_order() {
        let json = serde_json::to_string(&empty_record()).unwrap();
        let mut last = 0;
        for name in FIELD_NAMES {
            let needle = format!("\"{name}\":");
            let pos = json.find(&needle).unwrap_or_else(|| panic!("missing key {name}"));
            assert!(pos >= last, "key {name} out of order");
            last = pos;
        }
        // Unknown values are explicit nulls, never dropped keys.
        assert_eq!(json.matches("\":").count(), FIELD_NAMES.len());
        assert!(json.contains("\"ssid\":null"));
        assert!(json.contains("\"icmp_wan_ms\":null"));
    }

    #[test]
    fn roam_requires_both_sides_known_and_different() {
        assert!(!roam_detected(None, None));
        assert!(!roam_detected(None, Some("aa")));
        assert!(!roam_detected(Some("aa"), None));
        assert!(!roam_detected(Some("aa"), Some("aa")));
        assert!(roam_detected(Some("aa"), Some("bb")));
    }

    #[test]
    fn snr_is_rssi_minus_noise_with_zero_fallback() {
        assert_eq!(snr(Some(-52), Some(-95)), 43);
        assert_eq!(snr(Some(-52), None), 0);
        assert_eq!(snr(None, Some(-95)), 0);
        assert_eq!(snr(None, None), 0);
    }

    #[test]
    fn round_trips_through_json() {
        let mut state = SharedState::default();
        state.wifi.ssid = Some("LabNet".into());
        state.wifi.bssid = Some("aa:bb:cc:dd:ee:ff".into());
        state.wifi.rssi_dbm = Some(-60);
        state.wifi.noise_dbm = Some(-92);
        let rec = Record::build(&state, 1700000002, "2023-11-14 23:13:22".into(), Some("11:22"));
        assert_eq!(rec.bss_transition, 1);
        assert_eq!(rec.snr, 32);

        let json = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ssid.as_deref(), Some("LabNet"));
        assert_eq!(back.bss_transition, 1);
        assert_eq!(back.snr, 32);
    }
}
