//! Throughput probe (iperf3).
//!
//! One cycle runs two independent sub-tests against the configured peer:
//! receive-direction (`-R`) and transmit-direction. Each is bounded by the
//! test duration plus a margin, and each direction fails on its own without
//! blocking the other.

use super::ProbeError;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;

/// Slack added to the test duration before declaring a hang.
const IPERF_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Receive,
    Transmit,
}

/// One direction's achieved result, already converted to Mbps / MBytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputSample {
    pub mbps: f64,
    pub mbytes: f64,
}

#[derive(Debug, Deserialize)]
struct Report {
    end: EndSummary,
}

#[derive(Debug, Deserialize)]
struct EndSummary {
    sum_received: Option<StreamSum>,
    sum_sent: Option<StreamSum>,
}

#[derive(Debug, Deserialize)]
struct StreamSum {
    bits_per_second: f64,
    bytes: f64,
}

/// Pull the relevant end-of-test summary out of an `iperf3 --json` report.
/// The received sum carries the rate that actually crossed the air in either
/// direction's client-side report; the sent sum is used for transmit totals.
pub fn parse_iperf(raw: &str, direction: Direction) -> Result<ThroughputSample, ProbeError> {
    let report: Report =
        serde_json::from_str(raw).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let sum = match direction {
        Direction::Receive => report.end.sum_received,
        Direction::Transmit => report.end.sum_sent,
    }
    .ok_or_else(|| ProbeError::Parse("missing end summary".to_string()))?;

    Ok(ThroughputSample {
        mbps: sum.bits_per_second / 1e6,
        mbytes: sum.bytes / 1e6,
    })
}

/// Run one direction of the throughput test.
pub async fn sample(
    iperf_path: &str,
    server: &str,
    duration_s: u64,
    direction: Direction,
) -> Result<ThroughputSample, ProbeError> {
    let timeout = Duration::from_secs(duration_s) + IPERF_TIMEOUT_MARGIN;
    let mut cmd = Command::new(iperf_path);
    cmd.args(["-c", server, "-t", &duration_s.to_string(), "--json"])
        .kill_on_drop(true);
    if direction == Direction::Receive {
        cmd.arg("-R");
    }

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| ProbeError::Timeout(timeout))??;

    parse_iperf(&String::from_utf8_lossy(&output.stdout), direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "start": {"test_start": {"protocol": "TCP", "duration": 2}},
        "intervals": [],
        "end": {
            "sum_sent": {"start": 0, "end": 2.0, "bytes": 118500000, "bits_per_second": 474000000.0, "retransmits": 3},
            "sum_received": {"start": 0, "end": 2.0, "bytes": 117250000, "bits_per_second": 469000000.0}
        }
    }"#;

    #[test]
    fn parses_receive_summary() {
        let s = parse_iperf(REPORT, Direction::Receive).unwrap();
        assert!((s.mbps - 469.0).abs() < 1e-9);
        assert!((s.mbytes - 117.25).abs() < 1e-9);
    }

    #[test]
    fn parses_transmit_summary() {
        let s = parse_iperf(REPORT, Direction::Transmit).unwrap();
        assert!((s.mbps - 474.0).abs() < 1e-9);
        assert!((s.mbytes - 118.5).abs() < 1e-9);
    }

    #[test]
    fn server_error_is_a_parse_failure() {
        let raw = r#"{"error": "unable to connect to server: Connection refused"}"#;
        assert!(parse_iperf(raw, Direction::Receive).is_err());
    }

    #[test]
    fn non_json_output_is_a_parse_failure() {
        assert!(parse_iperf("iperf3: error - unable to connect\n", Direction::Transmit).is_err());
    }
}
