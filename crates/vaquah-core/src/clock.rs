//! Monotonic time source: injectable so cooldown and swipe-window logic is testable.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Monotonic clock. `now()` is the elapsed time since an arbitrary fixed origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Real clock backed by `Instant`, origin at construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven clock for tests and script replay.
///
/// Time only moves when `set` or `advance` is called.
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Duration::ZERO) }
    }

    pub fn at_ms(ms: u64) -> Self {
        Self { now: Mutex::new(Duration::from_millis(ms)) }
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set_ms(&self, ms: u64) {
        let target = Duration::from_millis(ms);
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if target > *now {
            *now = target;
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += Duration::from_millis(ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
