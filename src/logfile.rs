//! Append-only survey log.
//!
//! One JSON object per line. While the survey runs the file is named
//! `survey_<start>_running.jsonl`; clean shutdown renames it once to
//! `survey_<start>-<end>.jsonl`. The snapshot loop is the only writer; the
//! dashboard re-opens the file read-only and must cope with a partial last
//! line from an append still in flight.

use crate::record::Record;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SurveyLog {
    file: File,
    path: PathBuf,
    dir: PathBuf,
    start_epoch: i64,
}

fn running_name(start_epoch: i64) -> String {
    format!("survey_{start_epoch}_running.jsonl")
}

fn final_name(start_epoch: i64, end_epoch: i64) -> String {
    format!("survey_{start_epoch}-{end_epoch}.jsonl")
}

impl SurveyLog {
    /// Open the running log for this session, creating the directory if
    /// needed.
    pub fn open(dir: &Path, start_epoch: i64) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let path = dir.join(running_name(start_epoch));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        Ok(Self { file, path, dir: dir.to_path_buf(), start_epoch })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush so the dashboard's reader sees it.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_string(record).context("serializing record")?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).context("appending record")?;
        self.file.flush().context("flushing log")?;
        Ok(())
    }

    /// Close the session: rename the running file to its closed
    /// start-end name. Consumes the log, so no append can follow.
    pub fn finalize(self, end_epoch: i64) -> Result<PathBuf> {
        let final_path = self.dir.join(final_name(self.start_epoch, end_epoch));
        drop(self.file);
        std::fs::rename(&self.path, &final_path).with_context(|| {
            format!("renaming {} to {}", self.path.display(), final_path.display())
        })?;
        Ok(final_path)
    }
}

/// Read every complete record from a log file. A missing file reads as
/// empty (the not-yet-started state); an unparsable line, such as a partial
/// append at the tail, is discarded rather than treated as failure.
pub fn read_records(path: &Path) -> Vec<Record> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Record>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("discarding unparsable log line: {e}");
                None
            }
        })
        .collect()
}
