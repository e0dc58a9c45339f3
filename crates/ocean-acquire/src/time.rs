//! Time utilities for ocean-acquire.
//!
//! All timestamps are Unix epoch seconds (u64), matching the on-disk
//! purchase record format.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time.
///
/// The orchestrator reads time through this trait so quote expiry and
/// record timestamps can be pinned in tests.
pub trait Clock {
    /// Current time in seconds since the Unix epoch.
    fn now_secs(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        now_secs()
    }
}

/// A manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    secs: AtomicU64,
}

impl FixedClock {
    pub fn new(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}

/// Return the current time as seconds since Unix epoch.
///
/// A system clock set before the epoch reads as zero.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Convert seconds to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: u64) -> String {
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Convert seconds to a `YYYY-MM-DD HH:MM:SS` local-time string for display.
pub fn secs_to_display(secs: u64) -> String {
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
