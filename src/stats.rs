//! Session-wide aggregates, recomputed by replaying the whole log.
//!
//! Nothing here is persisted: every render derives the same numbers from the
//! same records, and appending a record only grows the cumulative counters.
//! Good enough for walk-a-building session lengths; a long-running variant
//! would maintain these incrementally in the snapshot loop instead.

use crate::record::Record;
use crate::state::INITIAL_LOCATION;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub elapsed_secs: i64,
    pub unique_ap_count: usize,
    pub unique_location_count: usize,
    pub roam_count: usize,
    pub avg_lan_ms: Option<f64>,
    pub avg_wan_ms: Option<f64>,
    pub avg_rx_mbps: Option<f64>,
    pub avg_tx_mbps: Option<f64>,
    pub total_rx_mbytes: f64,
    pub total_tx_mbytes: f64,
    pub lan_packets_sent: u64,
    pub lan_packets_lost: u64,
    pub wan_packets_sent: u64,
    pub wan_packets_lost: u64,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Packets lost in one record's ping sample, from its count and loss
/// percentage.
fn packets_lost(count: Option<u32>, loss_pct: Option<u32>) -> u64 {
    match (count, loss_pct) {
        (Some(count), Some(loss)) => {
            ((f64::from(count) * f64::from(loss) / 100.0).round()) as u64
        }
        _ => 0,
    }
}

impl SessionStats {
    pub fn from_records(records: &[Record]) -> Self {
        let mut bssids: HashSet<&str> = HashSet::new();
        let mut locations: HashSet<&str> = HashSet::new();
        let mut lan_pings = Vec::new();
        let mut wan_pings = Vec::new();
        let mut rx_rates = Vec::new();
        let mut tx_rates = Vec::new();
        let mut stats = SessionStats::default();

        for record in records {
            if record.bss_transition != 0 {
                stats.roam_count += 1;
            }
            if let Some(bssid) = record.bssid.as_deref() {
                bssids.insert(bssid);
            }
            if record.location != INITIAL_LOCATION {
                locations.insert(record.location.as_str());
            }

            if let Some(ms) = record.icmp_lan_ms {
                lan_pings.push(f64::from(ms));
            }
            if let Some(ms) = record.icmp_wan_ms {
                wan_pings.push(f64::from(ms));
            }
            stats.lan_packets_sent += u64::from(record.icmp_lan_count.unwrap_or(0));
            stats.lan_packets_lost += packets_lost(record.icmp_lan_count, record.icmp_lan_lost);
            stats.wan_packets_sent += u64::from(record.icmp_wan_count.unwrap_or(0));
            stats.wan_packets_lost += packets_lost(record.icmp_wan_count, record.icmp_wan_lost);

            if let Some(mbps) = record.iperf_rx_mbps {
                rx_rates.push(mbps);
            }
            if let Some(mbps) = record.iperf_tx_mbps {
                tx_rates.push(mbps);
            }
            stats.total_rx_mbytes += record.iperf_rx_mbytes.unwrap_or(0.0);
            stats.total_tx_mbytes += record.iperf_tx_mbytes.unwrap_or(0.0);
        }

        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            stats.elapsed_secs = last.epoch - first.epoch;
        }
        stats.unique_ap_count = bssids.len();
        stats.unique_location_count = locations.len();
        stats.avg_lan_ms = mean(&lan_pings);
        stats.avg_wan_ms = mean(&wan_pings);
        stats.avg_rx_mbps = mean(&rx_rates);
        stats.avg_tx_mbps = mean(&tx_rates);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedState;

    fn record(epoch: i64, bssid: Option<&str>, roam: bool) -> Record {
        let mut state = SharedState::default();
        state.wifi.bssid = bssid.map(str::to_string);
        let mut rec = Record::build(&state, epoch, "t".into(), None);
        rec.bss_transition = u8::from(roam);
        rec
    }

    fn sample_log() -> Vec<Record> {
        let mut a = record(100, Some("ap-1"), false);
        a.location = "lobby".into();
        a.icmp_lan_count = Some(4);
        a.icmp_lan_ms = Some(5);
        a.icmp_lan_lost = Some(0);
        a.iperf_rx_mbps = Some(400.0);
        a.iperf_rx_mbytes = Some(100.0);

        let mut b = record(110, Some("ap-2"), true);
        b.location = "stairwell".into();
        b.icmp_lan_count = Some(4);
        b.icmp_lan_lost = Some(50);
        b.icmp_wan_count = Some(4);
        b.icmp_wan_ms = Some(20);
        b.icmp_wan_lost = Some(0);
        b.iperf_rx_mbps = Some(200.0);
        b.iperf_rx_mbytes = Some(50.0);

        vec![a, b]
    }

    #[test]
    fn aggregates_a_small_session() {
        let stats = SessionStats::from_records(&sample_log());
        assert_eq!(stats.elapsed_secs, 10);
        assert_eq!(stats.unique_ap_count, 2);
        assert_eq!(stats.unique_location_count, 2);
        assert_eq!(stats.roam_count, 1);
        assert_eq!(stats.avg_lan_ms, Some(5.0));
        assert_eq!(stats.avg_wan_ms, Some(20.0));
        assert_eq!(stats.avg_rx_mbps, Some(300.0));
        assert_eq!(stats.total_rx_mbytes, 150.0);
        assert_eq!(stats.lan_packets_sent, 8);
        assert_eq!(stats.lan_packets_lost, 2);
        assert_eq!(stats.wan_packets_sent, 4);
        assert_eq!(stats.wan_packets_lost, 0);
    }

    #[test]
    fn replay_is_idempotent() {
        let log = sample_log();
        assert_eq!(SessionStats::from_records(&log), SessionStats::from_records(&log));
    }

    #[test]
    fn appending_grows_cumulative_counters_monotonically() {
        let mut log = sample_log();
        let before = SessionStats::from_records(&log);

        let mut extra = record(120, Some("ap-1"), false);
        extra.icmp_lan_count = Some(4);
        extra.icmp_lan_lost = Some(100);
        log.push(extra);
        let after = SessionStats::from_records(&log);

        assert!(after.unique_ap_count >= before.unique_ap_count);
        assert!(after.lan_packets_lost >= before.lan_packets_lost);
        assert!(after.lan_packets_sent > before.lan_packets_sent);
        assert!(after.total_rx_mbytes >= before.total_rx_mbytes);
        // Revisiting a known AP never inflates the unique count.
        assert_eq!(after.unique_ap_count, 2);
    }

    #[test]
    fn empty_log_yields_empty_stats() {
        let stats = SessionStats::from_records(&[]);
        assert_eq!(stats.elapsed_secs, 0);
        assert_eq!(stats.avg_lan_ms, None);
        assert_eq!(stats.unique_ap_count, 0);
    }

    #[test]
    fn placeholder_location_is_not_counted() {
        let rec = record(100, None, false);
        let stats = SessionStats::from_records(&[rec]);
        assert_eq!(stats.unique_location_count, 0);
    }
}
