//! Survey configuration
//!
//! Loaded once at startup from `config.json` next to the working directory.
//! A missing file is materialized with defaults so the operator has something
//! to edit; an unreadable or malformed file falls back to defaults with a
//! warning and the survey still runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";

/// Symbolic LAN ping target resolved at runtime from the discovered gateway.
pub const GATEWAY_TARGET: &str = "gateway";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub log_dir: String,
    pub wifi_cli_path: String,
    pub iperf_path: String,

    pub iperf_server: String,
    pub icmp_lan_server: String,
    pub icmp_wan_server: String,

    pub log_interval_s: f64,
    pub wifi_scan_interval_s: f64,
    pub icmp_interval_s: f64,
    pub icmp_packet_count: u32,
    pub iperf_interval_s: f64,
    pub iperf_duration_s: u64,

    pub export_logs: bool,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            log_dir: "surveys".to_string(),
            wifi_cli_path: "/usr/local/bin/corewlan-info".to_string(),
            iperf_path: "/usr/bin/iperf3".to_string(),
            iperf_server: "127.0.0.1".to_string(),
            icmp_lan_server: GATEWAY_TARGET.to_string(),
            icmp_wan_server: "8.8.8.8".to_string(),
            log_interval_s: 2.0,
            wifi_scan_interval_s: 1.0,
            icmp_interval_s: 1.5,
            icmp_packet_count: 4,
            iperf_interval_s: 15.0,
            iperf_duration_s: 2,
            export_logs: true,
        }
    }
}

impl SurveyConfig {
    /// Load config from `path`, materializing the default file when absent.
    pub async fn load(path: &Path) -> Self {
        if path.exists() {
            match tokio::fs::read_to_string(path).await {
                Ok(txt) => match serde_json::from_str::<SurveyConfig>(&txt) {
                    Ok(cfg) => {
                        info!("loaded configuration from {}", path.display());
                        cfg.validated()
                    }
                    Err(e) => {
                        warn!("invalid {}: {e}; using defaults", path.display());
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}; using defaults", path.display());
                    Self::default()
                }
            }
        } else {
            let cfg = Self::default();
            match cfg.save(path).await {
                Ok(()) => info!("created default configuration: {}", path.display()),
                Err(e) => warn!("could not create {}: {e}; using defaults", path.display()),
            }
            cfg
        }
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Enforce the positivity invariant on intervals and counts, replacing
    /// any violating value with its default.
    fn validated(mut self) -> Self {
        let defaults = Self::default();
        macro_rules! positive {
            ($field:ident) => {
                if self.$field <= Default::default() {
                    warn!(
                        "{} must be positive, falling back to {:?}",
                        stringify!($field),
                        defaults.$field
                    );
                    self.$field = defaults.$field;
                }
            };
        }
        positive!(log_interval_s);
        positive!(wifi_scan_interval_s);
        positive!(icmp_interval_s);
        positive!(icmp_packet_count);
        positive!(iperf_interval_s);
        positive!(iperf_duration_s);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SurveyConfig::default();
        assert!(cfg.log_interval_s > 0.0);
        assert!(cfg.icmp_packet_count > 0);
        assert_eq!(cfg.icmp_lan_server, GATEWAY_TARGET);
    }

    #[test]
    fn partial_config_fills_missing_keys() {
        let cfg: SurveyConfig =
            serde_json::from_str(r#"{"icmp_wan_server": "1.1.1.1", "export_logs": false}"#)
                .unwrap();
        assert_eq!(cfg.icmp_wan_server, "1.1.1.1");
        assert!(!cfg.export_logs);
        assert_eq!(cfg.log_dir, "surveys");
        assert_eq!(cfg.icmp_packet_count, 4);
    }

    #[test]
    fn nonpositive_values_fall_back_to_defaults() {
        let cfg: SurveyConfig =
            serde_json::from_str(r#"{"log_interval_s": -1, "icmp_packet_count": 0}"#).unwrap();
        let cfg = cfg.validated();
        assert_eq!(cfg.log_interval_s, 2.0);
        assert_eq!(cfg.icmp_packet_count, 4);
    }

    #[tokio::test]
    async fn missing_file_materializes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = SurveyConfig::load(&path).await;
        assert!(path.exists());
        assert_eq!(cfg.iperf_server, "127.0.0.1");

        // Reloading reads the file it just wrote.
        let again = SurveyConfig::load(&path).await;
        assert_eq!(again.icmp_wan_server, cfg.icmp_wan_server);
    }

    #[tokio::test]
    async fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "{not json").await.unwrap();
        let cfg = SurveyConfig::load(&path).await;
        assert_eq!(cfg.log_dir, "surveys");
    }
}
