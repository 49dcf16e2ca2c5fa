use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond wall clock, injectable so signatures can be reproduced in tests
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// A clock set before 1970 reads as 0 rather than failing.
pub fn system_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn system_clock() -> Clock {
    Arc::new(system_clock_ms)
}

/// Issues request nonces from the clock plus a caller-set drift offset.
///
/// Values never decrease, even if the clock steps backwards or several tasks
/// issue nonces at once.
pub struct NonceSource {
    clock: Clock,
    offset: AtomicI64,
    last: AtomicU64,
}

impl NonceSource {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            offset: AtomicI64::new(0),
            last: AtomicU64::new(0),
        }
    }

    pub fn with_offset(self, offset_ms: i64) -> Self {
        self.set_offset(offset_ms);
        self
    }

    pub fn next(&self) -> u64 {
        let now = (self.clock)();
        let candidate = now.saturating_add_signed(self.offset.load(Ordering::Relaxed));
        let previous = self.last.fetch_max(candidate, Ordering::AcqRel);
        previous.max(candidate)
    }

    pub fn set_offset(&self, offset_ms: i64) {
        self.offset.store(offset_ms, Ordering::Relaxed);
    }

    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::Relaxed)
    }
}

impl Default for NonceSource {
    fn default() -> Self {
        Self::new(system_clock())
    }
}

impl std::fmt::Debug for NonceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSource")
            .field("offset", &self.offset())
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
