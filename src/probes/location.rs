//! Operator location input.
//!
//! The operator types a free-text label and presses Enter whenever they move;
//! every subsequent record carries the new label. EOF on stdin ends the loop
//! quietly; the survey keeps running with the last label.

use crate::state::SurveyState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(state: SurveyState) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let label = line.trim().to_string();
                if label.is_empty() {
                    continue;
                }
                debug!("location set to {label:?}");
                state.lock().location = label;
            }
            Ok(None) => {
                debug!("stdin closed, location input done");
                return;
            }
            Err(e) => {
                debug!("location input error: {e}");
                return;
            }
        }
    }
}
