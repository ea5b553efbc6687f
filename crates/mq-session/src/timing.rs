//! Clock abstraction and countdown arithmetic
//!
//! Engines never accumulate elapsed time. Every query reads the clock and
//! derives remaining time from the recorded start, so repeated queries agree.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

/// Wall-clock source in Unix-epoch milliseconds
pub trait Clock: Send + Sync + Debug {
    fn now_ms(&self) -> i64;
}

/// Real time via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and simulation
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Shared handle, ready to pass to `with_clock`
    pub fn shared(start_ms: i64) -> Arc<Self> {
        Arc::new(Self::new(start_ms))
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Default clock handle
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Fixed-length countdown anchored at an optional start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub duration_ms: i64,
    pub started_at: Option<i64>,
}

impl Countdown {
    pub fn new(duration_ms: i64) -> Self {
        Self {
            duration_ms: duration_ms.max(0),
            started_at: None,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000))
    }

    pub fn start(&mut self, now_ms: i64) {
        self.started_at = Some(now_ms);
    }

    /// Milliseconds since start, 0 before start
    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        self.started_at
            .map(|start| now_ms.saturating_sub(start).max(0))
            .unwrap_or(0)
    }

    /// Remaining milliseconds, never negative; the full duration before start
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.duration_ms - self.elapsed_ms(now_ms)).max(0)
    }

    /// Remaining whole seconds, rounded up
    pub fn remaining_secs(&self, now_ms: i64) -> u64 {
        // remaining_ms is never negative
        (self.remaining_ms(now_ms) as u64).div_ceil(1000)
    }

    /// Expired once started and no time remains
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.started_at.is_some() && self.remaining_ms(now_ms) <= 0
    }
}
