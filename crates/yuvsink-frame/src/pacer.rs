//! Frame Pacing
//!
//! Keeps an absolute presentation schedule and a smoothed estimate of how far
//! ahead of it the producer is running.
//!
//! # How It Works
//!
//! Every completed frame advances the schedule by one frame time and feeds
//! the signed distance between schedule and clock into an exponential moving
//! average:
//!
//! ```text
//! wanted_ticks += frametime
//! delay         = wanted_ticks - now
//! avg_delay     = 0.1 * delay + 0.9 * avg_delay
//! ```
//!
//! The consumer sleeps `max(0, round(avg_delay))` milliseconds between polls.
//! Because the schedule is absolute rather than relative to wake-up times,
//! scheduling jitter is absorbed without accumulating drift.
//!
//! With a non-positive frame rate the frame time is zero and presentation
//! follows the producer.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use yuvsink_frame::{FramePacer, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new(1000));
//! let pacer = FramePacer::with_clock(25.0, clock.clone());
//!
//! pacer.start();
//! pacer.frame_completed();
//! assert_eq!(pacer.wanted_ticks(), Some(1040));
//! assert!((pacer.avg_delay() - 4.0).abs() < 1e-9);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

/// Weight of the newest delay sample in the moving average
pub const SMOOTHING_ALPHA: f64 = 0.1;

/// Longest frame time a positive frame rate maps to (one hour)
pub const MAX_FRAMETIME_MS: u64 = 3_600_000;

/// Millisecond time source
pub trait Clock: Send + Sync {
    /// Current time in milliseconds
    fn now_ms(&self) -> u64;
}

/// Monotonic clock counting from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually driven clock for deterministic tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Set the current time
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::Release);
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct Schedule {
    /// Unset until the first producer or consumer touch
    wanted_ticks: Option<u64>,
    avg_delay: f64,
}

/// Leaky-integrator presentation scheduler
pub struct FramePacer {
    frametime_ms: u64,
    clock: Arc<dyn Clock>,
    schedule: Mutex<Schedule>,
}

impl std::fmt::Debug for FramePacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schedule = self.schedule.lock();
        f.debug_struct("FramePacer")
            .field("frametime_ms", &self.frametime_ms)
            .field("wanted_ticks", &schedule.wanted_ticks)
            .field("avg_delay", &schedule.avg_delay)
            .finish_non_exhaustive()
    }
}

/// Frame time in milliseconds for a frame rate
///
/// Zero (no minimum) when the rate is not positive. Tiny positive rates
/// are capped at [`MAX_FRAMETIME_MS`].
pub fn frametime_ms(framerate: f64) -> u64 {
    if framerate.is_finite() && framerate > 0.0 {
        ((1000.0 / framerate).round() as u64).min(MAX_FRAMETIME_MS)
    } else {
        0
    }
}

impl FramePacer {
    /// Create a pacer on the monotonic clock
    pub fn new(framerate: f64) -> Self {
        Self::with_clock(framerate, Arc::new(MonotonicClock::new()))
    }

    /// Create a pacer on a custom clock
    pub fn with_clock(framerate: f64, clock: Arc<dyn Clock>) -> Self {
        let frametime_ms = frametime_ms(framerate);
        debug!("Frame pacer: {} fps -> {} ms per frame", framerate, frametime_ms);

        Self {
            frametime_ms,
            clock,
            schedule: Mutex::new(Schedule::default()),
        }
    }

    /// Target milliseconds between frames (0 = unthrottled)
    pub fn frametime_ms(&self) -> u64 {
        self.frametime_ms
    }

    /// Current clock reading
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Anchor the schedule at the current time if it is not yet running
    ///
    /// Returns the schedule position. Safe to call repeatedly.
    pub fn start(&self) -> u64 {
        let mut schedule = self.schedule.lock();
        *schedule.wanted_ticks.get_or_insert_with(|| self.clock.now_ms())
    }

    /// Advance the schedule by one frame and update the smoothed delay
    ///
    /// Returns the new smoothed delay in milliseconds.
    pub fn frame_completed(&self) -> f64 {
        let now = self.clock.now_ms();
        let mut schedule = self.schedule.lock();

        let wanted = schedule.wanted_ticks.unwrap_or(now).saturating_add(self.frametime_ms);
        schedule.wanted_ticks = Some(wanted);

        let delay = wanted.saturating_sub(now) as f64 - now.saturating_sub(wanted) as f64;
        schedule.avg_delay = SMOOTHING_ALPHA * delay + (1.0 - SMOOTHING_ALPHA) * schedule.avg_delay;

        trace!(
            "Pacing: wanted={} now={} delay={} avg={:.2}",
            wanted,
            now,
            delay,
            schedule.avg_delay
        );
        schedule.avg_delay
    }

    /// Scheduled time of the most recent frame, if started
    pub fn wanted_ticks(&self) -> Option<u64> {
        self.schedule.lock().wanted_ticks
    }

    /// Smoothed delay in milliseconds (may be negative)
    pub fn avg_delay(&self) -> f64 {
        self.schedule.lock().avg_delay
    }

    /// How long the consumer should idle before its next poll
    pub fn delay_hint(&self) -> Duration {
        let avg = self.avg_delay().round();
        if avg > 0.0 {
            Duration::from_millis(avg as u64)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer(framerate: f64, start: u64) -> (FramePacer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (FramePacer::with_clock(framerate, clock.clone()), clock)
    }

    #[test]
    fn test_frametime() {
        assert_eq!(frametime_ms(25.0), 40);
        assert_eq!(frametime_ms(30.0), 33);
        assert_eq!(frametime_ms(60.0), 17);
        assert_eq!(frametime_ms(0.0), 0);
        assert_eq!(frametime_ms(-5.0), 0);
        assert_eq!(frametime_ms(f64::NAN), 0);
        assert_eq!(frametime_ms(0.001), 1_000_000);
        assert_eq!(frametime_ms(1e-300), MAX_FRAMETIME_MS);
        assert_eq!(frametime_ms(f64::MIN_POSITIVE), MAX_FRAMETIME_MS);
    }

    #[test]
    fn test_tiny_framerate_stays_throttled() {
        let (pacer, clock) = pacer(1e-300, 1000);
        assert_eq!(pacer.frametime_ms(), MAX_FRAMETIME_MS);
        pacer.start();

        let mut last = 1000;
        for _ in 0..3 {
            clock.advance(10);
            let avg = pacer.frame_completed();
            assert!(avg > 0.0);
            let wanted = pacer.wanted_ticks().expect("started");
            assert!(wanted > last);
            last = wanted;
        }
        assert_eq!(last, 1000 + 3 * MAX_FRAMETIME_MS);
    }

    #[test]
    fn test_schedule_saturates_at_clock_limit() {
        let (pacer, _clock) = pacer(1.0, u64::MAX - 500);
        pacer.start();

        pacer.frame_completed();
        pacer.frame_completed();
        assert_eq!(pacer.wanted_ticks(), Some(u64::MAX));
        assert!(pacer.avg_delay() >= 0.0);
    }

    #[test]
    fn test_lazy_start_is_idempotent() {
        let (pacer, clock) = pacer(30.0, 500);
        assert_eq!(pacer.wanted_ticks(), None);

        assert_eq!(pacer.start(), 500);
        clock.advance(100);
        assert_eq!(pacer.start(), 500);
    }

    #[test]
    fn test_schedule_without_jitter() {
        let (pacer, clock) = pacer(60.0, 2000);
        let start = pacer.start();

        for n in 1..=50u64 {
            clock.set(start + n * 17);
            pacer.frame_completed();
            assert_eq!(pacer.wanted_ticks(), Some(start + n * 17));
        }
        assert_eq!(pacer.avg_delay(), 0.0);
        assert_eq!(pacer.delay_hint(), Duration::ZERO);
    }

    #[test]
    fn test_first_completion_starts_schedule() {
        let (pacer, _clock) = pacer(25.0, 300);
        pacer.frame_completed();
        assert_eq!(pacer.wanted_ticks(), Some(340));
    }

    #[test]
    fn test_smoothing() {
        let (pacer, _clock) = pacer(10.0, 0);
        pacer.start();

        // Producer instantly delivers frames: each is further ahead
        let first = pacer.frame_completed();
        assert!((first - 10.0).abs() < 1e-9);

        let second = pacer.frame_completed();
        assert!((second - (0.1 * 200.0 + 0.9 * 10.0)).abs() < 1e-9);

        assert_eq!(pacer.delay_hint(), Duration::from_millis(29));
    }

    #[test]
    fn test_late_producer_gives_zero_hint() {
        let (pacer, clock) = pacer(50.0, 0);
        pacer.start();

        clock.set(1000);
        let avg = pacer.frame_completed();
        assert!(avg < 0.0);
        assert_eq!(pacer.delay_hint(), Duration::ZERO);
    }

    #[test]
    fn test_wanted_ticks_monotonic() {
        let (pacer, clock) = pacer(0.0, 10);
        pacer.start();

        let mut last = 0;
        for step in [5u64, 0, 300, 1, 0] {
            clock.advance(step);
            pacer.frame_completed();
            let wanted = pacer.wanted_ticks().expect("started");
            assert!(wanted >= last);
            last = wanted;
        }
    }
}
