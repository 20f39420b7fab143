//! Live terminal dashboard.
//!
//! A pure function of the log's current contents: the last record is the
//! point-in-time view, the full replay supplies the session totals. Every
//! unknown field renders as an explicit N/A so a failing probe shows up as
//! degraded output, never as a crash or a blank screen.

use crate::logfile;
use crate::record::Record;
use crate::stats::SessionStats;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE_WIDTH: usize = 62;

fn opt_text(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

fn opt_num<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn opt_f1(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
}

fn section(out: &mut String, title: &str) {
    let dashes = RULE_WIDTH.saturating_sub(title.len() + 5);
    let _ = writeln!(out, "\n--- {title} {}", "-".repeat(dashes));
}

fn elapsed_hms(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Build the full dashboard text for the given records.
pub fn render_to_string(records: &[Record], tick_interval_s: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Wi-Fi Survey v{VERSION} ---");

    let Some(current) = records.last() else {
        let _ = writeln!(out, "\nWaiting for first data point...");
        let _ = write!(out, "\nEnter new location and press Enter: ");
        return out;
    };
    let stats = SessionStats::from_records(records);

    section(&mut out, "GLOBAL");
    let _ = writeln!(out, "{:<28} {}", "Location:", current.location);
    let _ = writeln!(out, "{:<28} {}", "Time:", current.timestamp);
    let _ = writeln!(out, "{:<28} {} s", "Log Interval:", tick_interval_s);

    section(&mut out, "RADIO");
    let bssid = match (current.bssid.as_deref(), current.bss_transition) {
        (Some(bssid), 1..) => format!("{bssid} (*ROAMED*)"),
        (Some(bssid), _) => bssid.to_string(),
        (None, _) => "N/A".to_string(),
    };
    let mut channel = opt_num(current.channel);
    if let (Some(band), Some(width)) =
        (current.channel_band.as_deref(), current.channel_width.as_deref())
    {
        let _ = write!(channel, " ({band}, {width})");
    }
    let _ = writeln!(out, "{:<28} {}", "SSID:", opt_text(current.ssid.as_deref()));
    let _ = writeln!(out, "{:<28} {}", "BSSID:", bssid);
    let _ = writeln!(out, "{:<28} {}", "Channel:", channel);
    let _ = writeln!(out, "{:<28} {}", "PHY Mode:", opt_text(current.phy_mode.as_deref()));
    let _ = writeln!(out, "{:<28} {}", "Auth:", opt_text(current.auth_mode.as_deref()));
    let _ = writeln!(out, "{:<28} {}", "Country:", opt_text(current.country_code.as_deref()));
    let _ = writeln!(out, "{:<28} {}", "NIC IP:", opt_text(current.nic_ip.as_deref()));
    let _ = writeln!(out, "{:<28} {}", "NIC MAC:", opt_text(current.nic_mac.as_deref()));
    let quality = match current.rssi_dbm {
        Some(rssi) if rssi > -65 => " (Good)",
        Some(_) => " (Poor)",
        None => "",
    };
    let _ = writeln!(out, "{:<28} {} dBm{}", "RSSI:", opt_num(current.rssi_dbm), quality);
    let _ = writeln!(out, "{:<28} {} dBm", "Noise:", opt_num(current.noise_dbm));
    let _ = writeln!(out, "{:<28} {} dB", "SNR:", current.snr);
    let _ = writeln!(out, "{:<28} {} Mbps", "Tx Rate:", opt_f1(current.tx_rate_mbps));

    section(&mut out, "DATA");
    let _ = writeln!(
        out,
        "{:<28} {} / {} Mbps",
        "Throughput (Rx/Tx):",
        opt_f1(current.iperf_rx_mbps),
        opt_f1(current.iperf_tx_mbps)
    );
    let _ = writeln!(
        out,
        "{:<28} {} ms ({}% lost) / {} ms ({}% lost)",
        "Latency (LAN/WAN):",
        opt_num(current.icmp_lan_ms),
        opt_num(current.icmp_lan_lost),
        opt_num(current.icmp_wan_ms),
        opt_num(current.icmp_wan_lost)
    );

    section(&mut out, "SESSION TOTALS");
    let _ = writeln!(out, "{:<28} {}", "Run Time:", elapsed_hms(stats.elapsed_secs));
    let _ = writeln!(
        out,
        "{:<28} {:.2} / {:.2} MB",
        "Total Data (Rx/Tx):", stats.total_rx_mbytes, stats.total_tx_mbytes
    );
    let _ = writeln!(
        out,
        "{:<28} {} / {} Mbps",
        "Avg. Throughput (Rx/Tx):",
        opt_f1(stats.avg_rx_mbps),
        opt_f1(stats.avg_tx_mbps)
    );
    let _ = writeln!(
        out,
        "{:<28} {} / {} ms",
        "Avg. Ping (LAN/WAN):",
        opt_f1(stats.avg_lan_ms),
        opt_f1(stats.avg_wan_ms)
    );
    let _ = writeln!(
        out,
        "{:<28} {} / {}",
        "Ping Pkts Sent (LAN/WAN):", stats.lan_packets_sent, stats.wan_packets_sent
    );
    let _ = writeln!(
        out,
        "{:<28} {} / {}",
        "Ping Pkts Lost (LAN/WAN):", stats.lan_packets_lost, stats.wan_packets_lost
    );
    let _ = writeln!(out, "{:<28} {}", "Unique APs:", stats.unique_ap_count);
    let _ = writeln!(out, "{:<28} {}", "Hops (Roams):", stats.roam_count);
    let _ = writeln!(out, "{:<28} {}", "Locations Logged:", stats.unique_location_count);

    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = write!(out, "Enter new location and press Enter, or Ctrl+C to save and quit > ");
    out
}

/// Clear the screen and redraw from the log file.
pub fn render(log_path: &Path, tick_interval_s: f64) {
    let records = logfile::read_records(log_path);
    let body = render_to_string(&records, tick_interval_s);
    print!("\x1b[2J\x1b[H{body}");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedState;

    #[test]
    fn empty_log_renders_waiting_state() {
        let out = render_to_string(&[], 2.0);
        assert!(out.contains("Waiting for first data point"));
    }

    #[test]
    fn unknown_fields_render_as_na() {
        let rec = Record::build(&SharedState::default(), 100, "t".into(), None);
        let out = render_to_string(&[rec], 2.0);
        assert!(out.contains("SSID:"));
        assert!(out.contains("N/A"));
        assert!(!out.contains("ROAMED"));
    }

    #[test]
    fn roam_marker_shows_on_transition() {
        let mut state = SharedState::default();
        state.wifi.bssid = Some("aa:bb".into());
        let rec = Record::build(&state, 100, "t".into(), Some("cc:dd"));
        let out = render_to_string(&[rec], 2.0);
        assert!(out.contains("aa:bb (*ROAMED*)"));
    }

    #[test]
    fn elapsed_formats_as_hms() {
        assert_eq!(elapsed_hms(0), "0:00:00");
        assert_eq!(elapsed_hms(3671), "1:01:11");
    }
}
