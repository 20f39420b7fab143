//! Poll workers: one endless loop per probe adapter.
//!
//! A worker invokes its adapter, merges the resulting field group into the
//! shared table under the lock, sleeps its own interval, and repeats. An
//! adapter failure is a valid outcome, logged at debug and turned into the
//! adapter's failure field set; the loop itself never stops.

use crate::config::{SurveyConfig, GATEWAY_TARGET};
use crate::probes::{icmp, iperf, wifi};
use crate::record::roam_detected;
use crate::state::{PingFields, SharedState, SurveyState};
use std::time::Duration;
use tracing::debug;

/// Refresh IP/gateway every Nth radio cycle (and on any observed roam).
const LINK_REFRESH_EVERY: u64 = 5;

/// Pause between the two iperf directions so the radio settles.
const IPERF_DIRECTION_GAP: Duration = Duration::from_secs(2);

/// Which ping field group a worker owns.
#[derive(Debug, Clone, Copy)]
pub enum PingSlot {
    Lan,
    Wan,
}

/// Resolve a configured ping target to a concrete address. The symbolic
/// gateway target reads the WiFi worker's discovery from shared state and
/// resolves to nothing until that value exists.
pub fn resolve_ping_target(state: &SharedState, configured: &str) -> Option<String> {
    if configured == GATEWAY_TARGET {
        state.link.gateway_ip.clone()
    } else {
        Some(configured.to_string())
    }
}

pub async fn wifi_worker(cfg: SurveyConfig, state: SurveyState) {
    let cli = wifi::CoreWlanCli::new(cfg.wifi_cli_path.clone());
    let interval = Duration::from_secs_f64(cfg.wifi_scan_interval_s);
    let mut last_bssid: Option<String> = None;
    let mut cycle: u64 = 0;

    loop {
        let mut roamed = false;
        match cli.sample().await {
            Ok(Some(fields)) => {
                roamed = roam_detected(last_bssid.as_deref(), fields.bssid.as_deref());
                if fields.bssid.is_some() {
                    last_bssid = fields.bssid.clone();
                }
                state.lock().wifi = fields;
            }
            Ok(None) => debug!("wifi probe: no associated interface"),
            Err(e) => debug!("wifi probe failed: {e}"),
        }

        if cycle % LINK_REFRESH_EVERY == 0 || roamed {
            match wifi::sample_link().await {
                Ok(link) => state.lock().link = link,
                Err(e) => debug!("link refresh failed: {e}"),
            }
        }
        cycle += 1;

        tokio::time::sleep(interval).await;
    }
}

pub async fn icmp_worker(cfg: SurveyConfig, state: SurveyState, slot: PingSlot) {
    let configured = match slot {
        PingSlot::Lan => cfg.icmp_lan_server.clone(),
        PingSlot::Wan => cfg.icmp_wan_server.clone(),
    };
    let interval = Duration::from_secs_f64(cfg.icmp_interval_s);
    let count = cfg.icmp_packet_count;

    loop {
        let target = resolve_ping_target(&state.lock(), &configured);
        let Some(target) = target else {
            // Gateway not discovered yet; this cycle must not ping anything.
            tokio::time::sleep(interval).await;
            continue;
        };

        let fields = match icmp::sample(&target, count).await {
            Ok(fields) => fields,
            Err(e) => {
                debug!("ping {target} failed: {e}");
                PingFields::lost_all(count)
            }
        };
        {
            let mut st = state.lock();
            match slot {
                PingSlot::Lan => st.icmp_lan = fields,
                PingSlot::Wan => st.icmp_wan = fields,
            }
        }

        tokio::time::sleep(interval).await;
    }
}

pub async fn iperf_worker(cfg: SurveyConfig, state: SurveyState) {
    let interval = Duration::from_secs_f64(cfg.iperf_interval_s);

    loop {
        let rx = iperf::sample(
            &cfg.iperf_path,
            &cfg.iperf_server,
            cfg.iperf_duration_s,
            iperf::Direction::Receive,
        )
        .await;
        {
            let mut st = state.lock();
            match &rx {
                Ok(sample) => {
                    st.throughput.rx_mbps = Some(sample.mbps);
                    st.throughput.rx_mbytes = Some(sample.mbytes);
                }
                Err(e) => {
                    debug!("iperf rx failed: {e}");
                    st.throughput.rx_mbps = None;
                    st.throughput.rx_mbytes = None;
                }
            }
        }

        tokio::time::sleep(IPERF_DIRECTION_GAP).await;

        let tx = iperf::sample(
            &cfg.iperf_path,
            &cfg.iperf_server,
            cfg.iperf_duration_s,
            iperf::Direction::Transmit,
        )
        .await;
        {
            let mut st = state.lock();
            match &tx {
                Ok(sample) => {
                    st.throughput.tx_mbps = Some(sample.mbps);
                    st.throughput.tx_mbytes = Some(sample.mbytes);
                }
                Err(e) => {
                    debug!("iperf tx failed: {e}");
                    st.throughput.tx_mbps = None;
                    st.throughput.tx_mbytes = None;
                }
            }
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_target_resolves_to_itself() {
        let state = SharedState::default();
        assert_eq!(resolve_ping_target(&state, "8.8.8.8").as_deref(), Some("8.8.8.8"));
    }

    #[test]
    fn symbolic_target_waits_for_gateway_discovery() {
        let mut state = SharedState::default();
        assert_eq!(resolve_ping_target(&state, GATEWAY_TARGET), None);

        state.link.gateway_ip = Some("192.168.178.1".into());
        assert_eq!(
            resolve_ping_target(&state, GATEWAY_TARGET).as_deref(),
            Some("192.168.178.1")
        );
    }
}
