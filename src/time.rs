//! Time handling for the viewer runtime.
//!
//! All lifecycle bookkeeping (last-use stamps, playback progress, idle
//! reclamation) runs off a monotonic millisecond timeline. The clock itself
//! is injected so tests can drive idle sweeps and playback deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A moment (or span) on the viewer's monotonic timeline, in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds
    #[inline]
    pub fn from_millis(milliseconds: u64) -> Self {
        Self(milliseconds)
    }

    /// Create a timestamp from whole seconds
    #[inline]
    pub fn from_seconds(seconds: u64) -> Self {
        Self(seconds.saturating_mul(1000))
    }

    /// Zero timestamp
    #[inline]
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the value in milliseconds
    #[inline]
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Get the value in seconds
    #[inline]
    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Span since an earlier timestamp. Saturates to zero if `earlier` is
    /// actually later, which keeps interleaved-task bookkeeping panic-free.
    #[inline]
    pub fn since(&self, earlier: Timestamp) -> Timestamp {
        Self(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add for Timestamp {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::ops::AddAssign for Timestamp {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self::from_millis(millis)
    }
}

impl From<Duration> for Timestamp {
    fn from(duration: Duration) -> Self {
        Self(duration.as_millis() as u64)
    }
}

impl From<Timestamp> for Duration {
    fn from(ts: Timestamp) -> Self {
        Duration::from_millis(ts.0)
    }
}

/// Monotonic clock consumed by the runtime
pub trait Clock: Send + Sync {
    /// Current time on the viewer timeline
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `instant`, monotonic from process start
#[derive(Debug)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl SystemClock {
    /// Create a system clock anchored at the current instant
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u64)
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    /// Create a manual clock starting at zero
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manual clock starting at the given millisecond value
    #[inline]
    pub fn starting_at(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Advance the clock by `millis`
    #[inline]
    pub fn advance_millis(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advance the clock by whole seconds
    #[inline]
    pub fn advance_seconds(&self, seconds: u64) {
        self.advance_millis(seconds.saturating_mul(1000));
    }

    /// Set the clock to an absolute millisecond value
    #[inline]
    pub fn set_millis(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_arithmetic() {
        let a = Timestamp::from_millis(1500);
        let b = Timestamp::from_seconds(2);

        assert_eq!(a.as_seconds(), 1.5);
        assert_eq!((a + b).as_millis(), 3500);
        assert_eq!(b.since(a).as_millis(), 500);
        // Saturating on the wrong order
        assert_eq!(a.since(b).as_millis(), 0);
    }

    #[test]
    fn test_duration_conversions() {
        let ts: Timestamp = Duration::from_secs(3).into();
        assert_eq!(ts.as_millis(), 3000);
        let back: Duration = ts.into();
        assert_eq!(back, Duration::from_secs(3));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Timestamp::zero());

        clock.advance_millis(250);
        clock.advance_seconds(1);
        assert_eq!(clock.now().as_millis(), 1250);

        clock.set_millis(42);
        assert_eq!(clock.now().as_millis(), 42);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
