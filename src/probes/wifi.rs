//! Radio probe.
//!
//! The actual CoreWLAN query lives in an external helper (`wifi_cli_path`)
//! that prints one JSON object of raw interface fields, numeric codes
//! included. This adapter owns everything after that: decoding the codes to
//! human labels, degrading missing attributes to unknown, and the throttled
//! local-IP / gateway refresh done with the system's own tools.

use super::ProbeError;
use crate::state::{LinkFields, WifiFields};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;

const WIFI_TIMEOUT: Duration = Duration::from_secs(2);

/// Raw fields as the helper reports them, CoreWLAN numeric codes intact.
/// Anything the interface could not provide is simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWifiInfo {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub channel: Option<u32>,
    pub band: Option<i64>,
    pub width: Option<i64>,
    pub phy: Option<i64>,
    pub security: Option<i64>,
    pub rssi_dbm: Option<i64>,
    pub noise_dbm: Option<i64>,
    pub tx_rate_mbps: Option<f64>,
    pub country_code: Option<String>,
    pub mac: Option<String>,
}

fn phy_label(code: i64) -> String {
    match code {
        0 => "Unknown",
        1 => "11a",
        2 => "11b",
        3 => "11g",
        4 => "11n",
        5 => "11ac",
        6 => "11ax",
        7 => "11be",
        other => return other.to_string(),
    }
    .to_string()
}

fn security_label(code: i64) -> String {
    match code {
        0 => "Open",
        1 => "WEP",
        2 => "WPA-PSK",
        3 => "WPA/2-PSK",
        4 => "WPA2-PSK",
        5 => "Personal",
        6 => "Dynamic WEP",
        7 => "WPA-EAP",
        8 => "WPA/2-EAP",
        9 => "WPA2-EAP",
        10 => "Enterprise",
        11 => "WPA3-SAE",
        12 => "WPA3-EAP",
        13 => "WPA3-Mix",
        other => return other.to_string(),
    }
    .to_string()
}

fn band_label(code: i64) -> String {
    match code {
        1 => "2.4GHz",
        2 => "5GHz",
        3 => "6GHz",
        other => return other.to_string(),
    }
    .to_string()
}

fn width_label(code: i64) -> String {
    match code {
        1 => "20MHz",
        2 => "40MHz",
        3 => "80MHz",
        4 => "160MHz",
        5 => "320MHz",
        other => return other.to_string(),
    }
    .to_string()
}

/// Map raw codes to display labels. A missing attribute stays unknown; an
/// unmapped code degrades to its stringified raw value instead of failing
/// the whole update.
pub fn decode(raw: RawWifiInfo) -> WifiFields {
    WifiFields {
        ssid: raw.ssid,
        bssid: raw.bssid,
        channel: raw.channel,
        channel_band: raw.band.map(band_label),
        channel_width: raw.width.map(width_label),
        phy_mode: raw.phy.map(phy_label),
        auth_mode: raw.security.map(security_label),
        country_code: raw.country_code,
        nic_mac: raw.mac,
        rssi_dbm: raw.rssi_dbm,
        noise_dbm: raw.noise_dbm,
        tx_rate_mbps: raw.tx_rate_mbps,
    }
}

/// External radio helper invocation.
pub struct CoreWlanCli {
    path: String,
}

impl CoreWlanCli {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Query the active interface. `Ok(None)` means the helper ran but found
    /// no associated interface; field values stay whatever they were.
    pub async fn sample(&self) -> Result<Option<WifiFields>, ProbeError> {
        let mut cmd = Command::new(&self.path);
        cmd.kill_on_drop(true);
        let output = tokio::time::timeout(WIFI_TIMEOUT, cmd.output())
            .await
            .map_err(|_| ProbeError::Timeout(WIFI_TIMEOUT))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        let raw: RawWifiInfo =
            serde_json::from_str(trimmed).map_err(|e| ProbeError::Parse(e.to_string()))?;
        Ok(Some(decode(raw)))
    }
}

fn gateway_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"gateway:\s+([\d\.]+)").unwrap())
}

/// Extract the default gateway address from `route -n get default` output.
pub fn parse_gateway(output: &str) -> Option<String> {
    gateway_re()
        .captures(output)
        .map(|c| c[1].to_string())
}

/// Refresh local IP and gateway IP with the system's own tools. Either half
/// may come back unknown; the caller decides whether to keep stale values.
pub async fn sample_link() -> Result<LinkFields, ProbeError> {
    let mut ip_cmd = Command::new("ipconfig");
    ip_cmd.args(["getifaddr", "en0"]).kill_on_drop(true);
    let ip_out = tokio::time::timeout(WIFI_TIMEOUT, ip_cmd.output())
        .await
        .map_err(|_| ProbeError::Timeout(WIFI_TIMEOUT))??;

    let nic_ip = {
        let s = String::from_utf8_lossy(&ip_out.stdout).trim().to_string();
        if s.is_empty() { None } else { Some(s) }
    };

    let mut route_cmd = Command::new("route");
    route_cmd.args(["-n", "get", "default"]).kill_on_drop(true);
    let route_out = tokio::time::timeout(WIFI_TIMEOUT, route_cmd.output())
        .await
        .map_err(|_| ProbeError::Timeout(WIFI_TIMEOUT))??;

    let gateway_ip = parse_gateway(&String::from_utf8_lossy(&route_out.stdout));

    Ok(LinkFields { nic_ip, gateway_ip })
}
