//! ICMP latency probe.
//!
//! Wraps one bounded `ping` invocation and extracts average round-trip time
//! and percent packet loss from its text summary. Unparsable output is not
//! an error: it reports as 100% loss with unknown latency, exactly like a
//! dead target.

use super::ProbeError;
use crate::state::PingFields;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;

/// Outer bound on one ping invocation, over the per-packet `-t 1` deadline.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

fn loss_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+\.?\d*)%\s+packet\s+loss").unwrap())
}

fn rtt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"min/avg/max/stddev\s*=\s*[\d.]+/([\d.]+)/").unwrap())
}

/// Parsed ping summary. Failure shows up as full loss, not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSummary {
    pub avg_ms: Option<u32>,
    pub loss_pct: u32,
}

/// Extract loss and average RTT from `ping` output. Missing loss figure
/// means the run never reached the summary, which counts as total loss.
pub fn parse_ping(output: &str) -> PingSummary {
    let loss_pct = loss_re()
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|p| p.round() as u32)
        .unwrap_or(100);

    let avg_ms = rtt_re()
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|ms| ms.round() as u32);

    PingSummary { avg_ms, loss_pct }
}

/// Run one ping cycle against `target`. The `-i 0.1` spacing keeps the whole
/// burst inside the outer timeout; `-t 1` bounds each reply wait.
pub async fn sample(target: &str, packet_count: u32) -> Result<PingFields, ProbeError> {
    let mut cmd = Command::new("ping");
    cmd.args(["-c", &packet_count.to_string(), "-i", "0.1", "-t", "1", target])
        .kill_on_drop(true);
    let output = tokio::time::timeout(PING_TIMEOUT, cmd.output())
        .await
        .map_err(|_| ProbeError::Timeout(PING_TIMEOUT))??;

    let summary = parse_ping(&String::from_utf8_lossy(&output.stdout));
    Ok(PingFields {
        avg_ms: summary.avg_ms,
        loss_pct: Some(summary.loss_pct),
        count: Some(packet_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_RUN: &str = "\
PING 192.168.1.1 (192.168.1.1): 56 data bytes
64 bytes from 192.168.1.1: icmp_seq=0 ttl=64 time=4.8 ms

--- 192.168.1.1 ping statistics ---
4 packets transmitted, 4 packets received, 0% packet loss
round-trip min/avg/max/stddev = 1/5/10/1 ms
";

    const PARTIAL_LOSS: &str = "\
--- 8.8.8.8 ping statistics ---
4 packets transmitted, 3 packets received, 25.0% packet loss
round-trip min/avg/max/stddev = 11.237/12.717/14.571/1.392 ms
";

    #[test]
    fn parses_clean_run() {
        let s = parse_ping(CLEAN_RUN);
        assert_eq!(s.loss_pct, 0);
        assert_eq!(s.avg_ms, Some(5));
    }

    #[test]
    fn parses_partial_loss_with_rounding() {
        let s = parse_ping(PARTIAL_LOSS);
        assert_eq!(s.loss_pct, 25);
        assert_eq!(s.avg_ms, Some(13));
    }

    #[test]
    fn garbage_output_is_total_loss() {
        let s = parse_ping("ping: cannot resolve nonsense.invalid: Unknown host\n");
        assert_eq!(s.loss_pct, 100);
        assert_eq!(s.avg_ms, None);
    }

    #[test]
    fn empty_output_is_total_loss() {
        let s = parse_ping("");
        assert_eq!(s.loss_pct, 100);
        assert_eq!(s.avg_ms, None);
    }
}
