//! Snapshot loop: the process driver.
//!
//! On a fixed tick it copies the shared table, derives the per-record fields
//! (roam flag, SNR, timestamps), appends one immutable record, and redraws
//! the dashboard. It is the sole writer of the log. The only way out is the
//! interrupt signal, which drives the ordered finalize sequence: stop
//! ticking, rename the log to its closed start-end name, then hand the final
//! path back for export. Nothing appends after the rename.

use crate::config::SurveyConfig;
use crate::dashboard;
use crate::logfile::SurveyLog;
use crate::record::{roam_detected, Record};
use crate::state::SurveyState;
use anyhow::Result;
use chrono::{Local, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Tracks the last known BSSID across ticks. An unknown tick does not clear
/// the baseline, so a brief scan dropout between two sightings of different
/// APs still registers as one roam.
#[derive(Debug, Default)]
pub struct RoamTracker {
    last_bssid: Option<String>,
}

impl RoamTracker {
    /// Feed one tick's BSSID; returns whether this tick is a roam.
    pub fn observe(&mut self, current: Option<&str>) -> bool {
        let roamed = roam_detected(self.last_bssid.as_deref(), current);
        if current.is_some() {
            self.last_bssid = current.map(str::to_string);
        }
        roamed
    }
}

/// Take one consistent snapshot and turn it into a record. The lock is held
/// only for the clone; stamping and derivation happen outside it.
fn snapshot_record(state: &SurveyState, tracker: &mut RoamTracker) -> Record {
    let snapshot = state.lock().clone();
    let now = Utc::now().timestamp();
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let previous = tracker.last_bssid.clone();
    tracker.observe(snapshot.wifi.bssid.as_deref());
    Record::build(&snapshot, now, timestamp, previous.as_deref())
}

/// Run until interrupted; returns the finalized log path.
pub async fn run(cfg: &SurveyConfig, state: SurveyState, mut log: SurveyLog) -> Result<PathBuf> {
    let mut tick = tokio::time::interval(Duration::from_secs_f64(cfg.log_interval_s));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The interval's first tick fires immediately; consume it so the first
    // record lands a full period in, with the workers warmed up.
    tick.tick().await;

    let mut tracker = RoamTracker::default();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let record = snapshot_record(&state, &mut tracker);
                if let Err(e) = log.append(&record) {
                    error!("failed to append record: {e}");
                    continue;
                }
                dashboard::render(log.path(), cfg.log_interval_s);
            }
            _ = &mut shutdown => {
                info!("interrupt received, finalizing survey");
                break;
            }
        }
    }

    let end_epoch = Utc::now().timestamp();
    let final_path = log.finalize(end_epoch)?;
    println!("\n\n--- Survey Stopped ---");
    println!("Log saved to: {}", final_path.display());
    Ok(final_path)
}
