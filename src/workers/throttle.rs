use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared monotonic deadline before which no accrual request may be issued.
/// Writes take the maximum of the current and proposed deadlines, so
/// concurrent holds can only extend the quiet window, never shrink it.
#[derive(Debug)]
pub struct Throttle {
    epoch: Instant,
    until_ms: AtomicU64,
}

impl Throttle {
    #[must_use]
    pub fn new() -> Self {
        Self { epoch: Instant::now(), until_ms: AtomicU64::new(0) }
    }

    /// Extends the quiet window to at least `pause` from now.
    pub fn hold_for(&self, pause: Duration) {
        let target = self.now_ms().saturating_add(u64::try_from(pause.as_millis()).unwrap_or(u64::MAX));
        self.until_ms.fetch_max(target, Ordering::AcqRel);
    }

    /// Time left before requests may resume, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let now = self.now_ms();
        let until = self.until_ms.load(Ordering::Acquire);
        (until > now).then(|| Duration::from_millis(until - now))
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}
