//! Single-slot frame handoff
//!
//! A mailbox holding at most one presentation-ready frame. The producer
//! publishes only when the slot is free and never waits; the consumer takes
//! the frame when one is pending.
//!
//! # Protocol
//!
//! ```text
//!  producer                     pending                 consumer
//!  ────────                     ───────                 ────────
//!  publish(): copy into slot    false ──► true
//!                                          true         take(): read slot
//!                               false ◄── true          guard dropped
//! ```
//!
//! The slot is only written while `pending` is false and only read while it
//! is true, so its lock is never contended. The pending flag orders access;
//! the mutex only gives safe shared mutability of the slot without `unsafe`.
//! A completion that finds a frame still pending is dropped rather than
//! queued.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::geometry::FrameGeometry;
use crate::planes::PlaneBuffers;

/// Result of a publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Frame copied into the slot and marked pending
    Published,
    /// A frame is still pending; this one was dropped
    Busy,
    /// No presentation surface is attached; this frame was dropped
    Detached,
}

/// Handoff counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandoffStats {
    /// Frames that became pending
    pub published: u64,
    /// Frames dropped because one was already pending
    pub dropped_busy: u64,
    /// Frames dropped because no surface was attached
    pub dropped_detached: u64,
    /// Frames taken by the consumer
    pub taken: u64,
}

/// Single-slot mailbox between the frame assembler and the presentation loop
#[derive(Debug)]
pub struct FrameHandoff {
    pending: AtomicBool,
    attached: AtomicBool,
    slot: Mutex<PlaneBuffers>,
    published: AtomicU64,
    dropped_busy: AtomicU64,
    dropped_detached: AtomicU64,
    taken: AtomicU64,
}

impl FrameHandoff {
    /// Create an empty, detached handoff sized for `geometry`
    pub fn new(geometry: &FrameGeometry) -> Self {
        Self {
            pending: AtomicBool::new(false),
            attached: AtomicBool::new(false),
            slot: Mutex::new(PlaneBuffers::new(geometry)),
            published: AtomicU64::new(0),
            dropped_busy: AtomicU64::new(0),
            dropped_detached: AtomicU64::new(0),
            taken: AtomicU64::new(0),
        }
    }

    /// Mark a presentation surface as available
    pub fn attach(&self) {
        self.attached.store(true, Ordering::Release);
        debug!("Presentation surface attached to handoff");
    }

    /// Mark the presentation surface as gone
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        debug!("Presentation surface detached from handoff");
    }

    /// Whether a surface is attached
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Whether a frame is waiting for the consumer
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Publish a completed frame if the slot is free, otherwise drop it
    pub fn publish(&self, planes: &PlaneBuffers) -> PublishOutcome {
        if !self.is_attached() {
            self.dropped_detached.fetch_add(1, Ordering::Relaxed);
            return PublishOutcome::Detached;
        }

        if self.is_pending() {
            self.dropped_busy.fetch_add(1, Ordering::Relaxed);
            trace!("Frame dropped: previous frame still pending");
            return PublishOutcome::Busy;
        }

        self.slot.lock().copy_from(planes);
        self.pending.store(true, Ordering::Release);
        self.published.fetch_add(1, Ordering::Relaxed);
        PublishOutcome::Published
    }

    /// Take the pending frame, if any
    ///
    /// The slot is released for the next publish when the returned guard is
    /// dropped.
    pub fn take(&self) -> Option<PendingFrame<'_>> {
        if !self.is_pending() {
            return None;
        }

        let slot = self.slot.lock();
        self.taken.fetch_add(1, Ordering::Relaxed);
        Some(PendingFrame {
            slot,
            _release: ReleaseOnDrop {
                pending: &self.pending,
            },
        })
    }

    /// Snapshot of the handoff counters
    pub fn stats(&self) -> HandoffStats {
        HandoffStats {
            published: self.published.load(Ordering::Relaxed),
            dropped_busy: self.dropped_busy.load(Ordering::Relaxed),
            dropped_detached: self.dropped_detached.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
        }
    }
}

/// A frame taken from the handoff
///
/// Dereferences to the frame's planes. Dropping it clears the pending flag.
#[derive(Debug)]
pub struct PendingFrame<'a> {
    // Field order matters: the slot unlocks before the flag clears, so a
    // publish never waits on the lock
    slot: MutexGuard<'a, PlaneBuffers>,
    _release: ReleaseOnDrop<'a>,
}

impl Deref for PendingFrame<'_> {
    type Target = PlaneBuffers;

    fn deref(&self) -> &PlaneBuffers {
        &self.slot
    }
}

#[derive(Debug)]
struct ReleaseOnDrop<'a> {
    pending: &'a AtomicBool,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::Plane;

    fn setup() -> (FrameHandoff, PlaneBuffers) {
        let geometry = FrameGeometry::new(4, 2).expect("geometry");
        (FrameHandoff::new(&geometry), PlaneBuffers::new(&geometry))
    }

    #[test]
    fn test_detached_drops() {
        let (handoff, planes) = setup();
        assert_eq!(handoff.publish(&planes), PublishOutcome::Detached);
        assert!(!handoff.is_pending());
        assert!(handoff.take().is_none());
        assert_eq!(handoff.stats().dropped_detached, 1);
    }

    #[test]
    fn test_publish_then_take() {
        let (handoff, mut planes) = setup();
        handoff.attach();

        planes.scanline_mut(1).y.fill(99);
        assert_eq!(handoff.publish(&planes), PublishOutcome::Published);
        assert!(handoff.is_pending());

        {
            let frame = handoff.take().expect("pending frame");
            assert_eq!(&frame.plane(Plane::Y)[4..], &[99, 99, 99, 99]);
            assert!(handoff.is_pending());
        }
        assert!(!handoff.is_pending());
        assert!(handoff.take().is_none());
    }

    #[test]
    fn test_at_most_one_pending() {
        let (handoff, mut planes) = setup();
        handoff.attach();

        planes.scanline_mut(0).y.fill(1);
        assert_eq!(handoff.publish(&planes), PublishOutcome::Published);

        // Later completions are dropped and do not touch the slot
        planes.scanline_mut(0).y.fill(2);
        assert_eq!(handoff.publish(&planes), PublishOutcome::Busy);
        assert_eq!(handoff.publish(&planes), PublishOutcome::Busy);

        let frame = handoff.take().expect("pending frame");
        assert_eq!(frame.plane(Plane::Y)[0], 1);
        drop(frame);

        assert_eq!(handoff.publish(&planes), PublishOutcome::Published);
        assert_eq!(handoff.take().expect("pending frame").plane(Plane::Y)[0], 2);

        let stats = handoff.stats();
        assert_eq!(stats.published, 2);
        assert_eq!(stats.dropped_busy, 2);
        assert_eq!(stats.taken, 2);
    }

    #[test]
    fn test_cross_thread_handoff() {
        use std::sync::Arc;

        let geometry = FrameGeometry::new(8, 8).expect("geometry");
        let handoff = Arc::new(FrameHandoff::new(&geometry));
        handoff.attach();

        let consumer = {
            let handoff = Arc::clone(&handoff);
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                while seen.len() < 20 {
                    if let Some(frame) = handoff.take() {
                        seen.push(frame.plane(Plane::Y)[0]);
                    } else {
                        std::thread::yield_now();
                    }
                }
                seen
            })
        };

        let mut planes = PlaneBuffers::new(&geometry);
        let mut value = 0u8;
        while handoff.stats().published < 20 {
            planes.scanline_mut(0).y.fill(value);
            planes.scanline_mut(7).y.fill(value);
            if handoff.publish(&planes) == PublishOutcome::Published {
                value = value.wrapping_add(1);
            }
        }

        let seen = consumer.join().expect("consumer thread");
        // Every taken frame is a distinct, in-order publish
        assert_eq!(seen, (0..20).collect::<Vec<u8>>());
    }
}
