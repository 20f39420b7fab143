//! wifi-survey - walk-around Wi-Fi site survey logger
//!
//! Independent poll workers sample the radio, two ping targets, and an
//! iperf3 peer at their own cadence into a shared latest-known table. A
//! fixed-interval snapshot loop turns that table into immutable JSONL
//! records and redraws a terminal dashboard reconstructed purely from the
//! log. Ctrl+C finalizes the log and optionally exports it to CSV.

mod config;
mod dashboard;
mod export;
mod logfile;
mod probes;
mod record;
mod snapshot;
mod state;
mod stats;
mod workers;

use anyhow::{bail, Result};
use chrono::Utc;
use config::{SurveyConfig, CONFIG_FILE};
use logfile::SurveyLog;
use state::{new_state, SharedState};
use std::io::Write as _;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cfg = SurveyConfig::load(Path::new(CONFIG_FILE)).await;

    // The throughput peer tool is the one hard startup dependency; without
    // it the survey would silently log N/A throughput for the whole walk.
    if !Path::new(&cfg.iperf_path).exists() {
        bail!("iperf3 not found at {}; install it or fix iperf_path in {}", cfg.iperf_path, CONFIG_FILE);
    }

    let start_epoch = Utc::now().timestamp();
    let log = SurveyLog::open(Path::new(&cfg.log_dir), start_epoch)?;
    info!("logging to {}", log.path().display());

    let state = new_state(SharedState::default());

    tokio::spawn(probes::location::run(state.clone()));
    tokio::spawn(workers::wifi_worker(cfg.clone(), state.clone()));
    tokio::spawn(workers::icmp_worker(cfg.clone(), state.clone(), workers::PingSlot::Lan));
    tokio::spawn(workers::icmp_worker(cfg.clone(), state.clone(), workers::PingSlot::Wan));
    tokio::spawn(workers::iperf_worker(cfg.clone(), state.clone()));

    print!("Enter starting location: ");
    let _ = std::io::stdout().flush();

    let final_path = snapshot::run(&cfg, state, log).await?;

    if cfg.export_logs {
        export::export_csv(&final_path);
    }

    Ok(())
}
