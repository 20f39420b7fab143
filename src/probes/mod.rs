//! Probe adapters: one per external measurement source.
//!
//! Each adapter performs exactly one external invocation per call, parses
//! the result, and hands back either a typed field set or a `ProbeError`.
//! Errors never cross the worker boundary; the worker turns them into
//! failure-marker fields or skips the write and keeps looping.

pub mod icmp;
pub mod iperf;
pub mod location;
pub mod wifi;

use std::time::Duration;
use thiserror::Error;

/// Why a single poll cycle produced nothing usable.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("command failed to run: {0}")]
    Io(#[from] std::io::Error),
    #[error("unparsable output: {0}")]
    Parse(String),
}
