//! Wait Mechanisms
//!
//! Every auto-wait in the replayer goes through [`poll_until`]: a pure
//! poll-predicate-with-deadline loop. Time is read and spent through the
//! [`Clock`] trait so the same loop runs against the wall clock or against
//! a [`ManualClock`] that only advances when something sleeps on it.

use crate::result::ReplayError;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for actions and assertions (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default timeout for navigation (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// CLOCK
// =============================================================================

/// Source of monotonic time for waits.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Suspend the caller for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time; sleeping blocks the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
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

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual time for deterministic tests.
///
/// Clones share the same time line. `sleep` advances time instantly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms())
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation flag shared between a run and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T, E> {
    /// Condition holds; stop waiting
    Ready(T),
    /// Condition does not hold yet; `E` is what was observed
    Pending(E),
}

/// Why a wait ended without the condition holding.
#[derive(Debug)]
pub enum WaitError<E> {
    /// Deadline passed; carries the last observation
    Timeout {
        /// Last pending observation
        last: E,
        /// Time spent waiting
        waited: Duration,
    },
    /// Cancel token fired
    Cancelled,
    /// The probe itself failed
    Failed(ReplayError),
}

/// Successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waited<T> {
    /// Value produced by the satisfied probe
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes made
    pub polls: u32,
}

/// Poll `probe` until it is ready, the deadline passes, or `cancel` fires.
///
/// The probe always runs at least once, so a zero timeout still observes the
/// current state. Sleeps never overshoot the deadline.
pub fn poll_until<C, T, E, F>(
    clock: &C,
    options: &WaitOptions,
    cancel: &CancelToken,
    mut probe: F,
) -> Result<Waited<T>, WaitError<E>>
where
    C: Clock + ?Sized,
    F: FnMut() -> Result<Probe<T, E>, ReplayError>,
{
    let start = clock.now();
    let deadline = start + options.timeout();
    let mut polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }

        polls += 1;
        match probe().map_err(WaitError::Failed)? {
            Probe::Ready(value) => {
                return Ok(Waited {
                    value,
                    elapsed: clock.now().saturating_sub(start),
                    polls,
                });
            }
            Probe::Pending(last) => {
                let now = clock.now();
                if now >= deadline {
                    tracing::debug!(polls, "wait deadline reached");
                    return Err(WaitError::Timeout {
                        last,
                        waited: now.saturating_sub(start),
                    });
                }
                let remaining = deadline - now;
                clock.sleep(options.poll_interval().min(remaining).max(Duration::from_millis(1)));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod clock_tests {
        use super::*;

        #[test]
        fn test_manual_clock_starts_at_zero() {
            let clock = ManualClock::new();
            assert_eq!(clock.now(), Duration::ZERO);
        }

        #[test]
        fn test_manual_clock_sleep_advances() {
            let clock = ManualClock::new();
            clock.sleep(Duration::from_millis(120));
            assert_eq!(clock.now_ms(), 120);
        }

        #[test]
        fn test_manual_clock_clones_share_time() {
            let clock = ManualClock::new();
            let other = clock.clone();
            other.advance(Duration::from_millis(40));
            assert_eq!(clock.now_ms(), 40);
        }

        #[test]
        fn test_system_clock_monotonic() {
            let clock = SystemClock::new();
            let a = clock.now();
            clock.sleep(Duration::from_millis(5));
            assert!(clock.now() >= a + Duration::from_millis(5));
        }
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_chained() {
            let opts = WaitOptions::new().with_timeout(10_000).with_poll_interval(200);
            assert_eq!(opts.timeout(), Duration::from_secs(10));
            assert_eq!(opts.poll_interval(), Duration::from_millis(200));
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_ready_immediately() {
            let clock = ManualClock::new();
            let result = poll_until(&clock, &WaitOptions::new(), &CancelToken::new(), || {
                Ok::<_, ReplayError>(Probe::<_, ()>::Ready(7))
            })
            .unwrap();
            assert_eq!(result.value, 7);
            assert_eq!(result.polls, 1);
            assert_eq!(clock.now_ms(), 0);
        }

        #[test]
        fn test_zero_timeout_still_probes_once() {
            let clock = ManualClock::new();
            let options = WaitOptions::new().with_timeout(0);
            let mut calls = 0;
            let result = poll_until(&clock, &options, &CancelToken::new(), || {
                calls += 1;
                Ok::<_, ReplayError>(Probe::<(), _>::Pending("nope"))
            });
            assert_eq!(calls, 1);
            assert!(matches!(result, Err(WaitError::Timeout { last: "nope", .. })));
        }

        #[test]
        fn test_timeout_carries_last_observation() {
            let clock = ManualClock::new();
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(30);
            let mut n = 0;
            let result = poll_until(&clock, &options, &CancelToken::new(), || {
                n += 1;
                Ok::<_, ReplayError>(Probe::<(), _>::Pending(n))
            });
            match result {
                Err(WaitError::Timeout { last, waited }) => {
                    assert_eq!(last, n);
                    assert_eq!(waited, Duration::from_millis(100));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
            // 0, 30, 60, 90, 100
            assert_eq!(n, 5);
        }

        #[test]
        fn test_becomes_ready_after_time_passes() {
            let clock = ManualClock::new();
            let probe_clock = clock.clone();
            let options = WaitOptions::new().with_timeout(1000).with_poll_interval(50);
            let result = poll_until(&clock, &options, &CancelToken::new(), || {
                if probe_clock.now_ms() >= 200 {
                    Ok::<_, ReplayError>(Probe::<_, ()>::Ready("done"))
                } else {
                    Ok(Probe::Pending(()))
                }
            })
            .unwrap();
            assert_eq!(result.value, "done");
            assert_eq!(result.elapsed, Duration::from_millis(200));
        }

        #[test]
        fn test_cancel_stops_waiting() {
            let clock = ManualClock::new();
            let cancel = CancelToken::new();
            let trigger = cancel.clone();
            let mut n = 0;
            let result = poll_until(&clock, &WaitOptions::new(), &cancel, || {
                n += 1;
                if n == 3 {
                    trigger.cancel();
                }
                Ok::<_, ReplayError>(Probe::<(), ()>::Pending(()))
            });
            assert!(matches!(result, Err(WaitError::Cancelled)));
            assert_eq!(n, 3);
        }

        #[test]
        fn test_probe_failure_propagates() {
            let clock = ManualClock::new();
            let result = poll_until(&clock, &WaitOptions::new(), &CancelToken::new(), || {
                Err::<Probe<(), ()>, _>(ReplayError::PageClosed)
            });
            assert!(matches!(
                result,
                Err(WaitError::Failed(ReplayError::PageClosed))
            ));
        }
    }
}
