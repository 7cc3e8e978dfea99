//! Presentation Loop
//!
//! Runs on a dedicated thread and owns the [`PresentationSurface`]
//! exclusively.
//!
//! # Lifecycle
//!
//! ```text
//! Starting ──acquire ok──▶ Running ──quit──▶ TearingDown ──▶ Stopped
//!     │                                                        ▲
//!     └──────────────acquire failed────────────────────────────┘
//! ```
//!
//! Every transition is broadcast on a [`tokio::sync::watch`] channel. Leaving
//! `Running` (or failing to get there) marks the shared state as shut down,
//! so the producer returns `Done` from then on.
//!
//! # Iteration
//!
//! Each poll checks for a quit request from either side, starts the pacing
//! schedule if needed, sleeps for the smoothed delay (or yields), then takes
//! a pending frame if there is one, uploads it and presents it.

use std::sync::Arc;
use std::thread;

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};
use yuvsink_frame::SharedState;

use crate::error::{PresentError, Result};
use crate::surface::{PresentationSurface, SurfaceFactory, SurfaceRequest};

/// Presentation thread lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Acquiring the surface
    Starting,
    /// Presenting frames
    Running,
    /// Releasing the surface
    TearingDown,
    /// Thread finished; the sink reports `Done`
    Stopped,
}

impl LoopState {
    /// Whether the loop has left `Running` for good
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::TearingDown | Self::Stopped)
    }
}

/// Consumer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenterStats {
    /// Loop iterations
    pub polls: u64,
    /// Frames uploaded and presented
    pub frames_presented: u64,
    /// Uploads that failed
    pub update_failures: u64,
}

/// Consumer side of a video sink
#[derive(Debug)]
pub struct PresentationLoop<S> {
    surface: S,
    shared: Arc<SharedState>,
    state_tx: watch::Sender<LoopState>,
    update_failure_limit: u32,
    consecutive_failures: u32,
    stats: PresenterStats,
}

impl<S: PresentationSurface> PresentationLoop<S> {
    /// Acquire a surface and enter `Running`
    ///
    /// On failure the shared state is marked shut down and the loop goes
    /// straight to `Stopped`.
    pub fn start<F>(
        factory: F,
        request: &SurfaceRequest,
        shared: Arc<SharedState>,
        state_tx: watch::Sender<LoopState>,
        update_failure_limit: u32,
    ) -> Result<Self>
    where
        F: SurfaceFactory<Surface = S>,
    {
        state_tx.send_replace(LoopState::Starting);

        let surface = match factory.create_surface(request) {
            Ok(surface) => surface,
            Err(e) => {
                error!("{}", e);
                shared.signal.mark_shutdown();
                shared.handoff.detach();
                state_tx.send_replace(LoopState::Stopped);
                return Err(e.into());
            }
        };

        shared.handoff.attach();
        state_tx.send_replace(LoopState::Running);
        info!(
            "Presenting \"{}\" at {}x{} ({} ms per frame)",
            request.title,
            request.width,
            request.height,
            shared.pacer.frametime_ms()
        );

        Ok(Self {
            surface,
            shared,
            state_tx,
            update_failure_limit,
            consecutive_failures: 0,
            stats: PresenterStats::default(),
        })
    }

    /// Run until a quit is observed, then tear down
    pub fn run(mut self) -> Result<PresenterStats> {
        let outcome = loop {
            match self.poll() {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let stats = self.teardown();
        outcome.map(|()| stats)
    }

    /// One loop iteration
    ///
    /// Returns `Ok(false)` once a quit has been requested.
    pub fn poll(&mut self) -> Result<bool> {
        if self.shared.signal.is_quit_requested() || self.surface.quit_requested() {
            debug!("Quit observed by presentation loop");
            return Ok(false);
        }

        self.shared.pacer.start();
        let delay = self.shared.pacer.delay_hint();
        if delay.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(delay);
        }
        self.stats.polls += 1;

        let Some(frame) = self.shared.handoff.take() else {
            return Ok(true);
        };

        match self.surface.update_planar_frame(frame.as_frame()) {
            Ok(()) => {
                self.surface.present();
                self.stats.frames_presented += 1;
                self.consecutive_failures = 0;
                trace!("Presented frame #{}", self.stats.frames_presented);
            }
            Err(e) => {
                self.stats.update_failures += 1;
                self.consecutive_failures += 1;
                warn!("{} ({} in a row)", e, self.consecutive_failures);

                if self.update_failure_limit > 0 && self.consecutive_failures >= self.update_failure_limit {
                    error!(
                        "Giving up after {} consecutive update failures",
                        self.consecutive_failures
                    );
                    return Err(PresentError::UpdateFailures(self.consecutive_failures));
                }
            }
        }

        Ok(true)
    }

    /// Counters so far
    pub fn stats(&self) -> PresenterStats {
        self.stats
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoopState {
        *self.state_tx.borrow()
    }

    fn teardown(self) -> PresenterStats {
        let Self {
            surface,
            shared,
            state_tx,
            stats,
            ..
        } = self;

        state_tx.send_replace(LoopState::TearingDown);
        shared.signal.mark_shutdown();
        shared.handoff.detach();
        drop(surface);
        state_tx.send_replace(LoopState::Stopped);

        info!(
            "Presentation stopped: {} frames presented, {} update failures",
            stats.frames_presented, stats.update_failures
        );
        stats
    }
}

/// Body of the presentation thread
pub fn run_presentation<F: SurfaceFactory>(
    factory: F,
    request: &SurfaceRequest,
    shared: Arc<SharedState>,
    state_tx: watch::Sender<LoopState>,
    update_failure_limit: u32,
) -> Result<PresenterStats> {
    PresentationLoop::start(factory, request, shared, state_tx, update_failure_limit)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurfaceHandle;
    use yuvsink_frame::{FrameGeometry, FramePacer, ManualClock, PlaneBuffers, PublishOutcome};

    fn setup(framerate: f64) -> (Arc<SharedState>, PlaneBuffers, SurfaceRequest) {
        let geometry = FrameGeometry::new(4, 2).expect("geometry");
        let pacer = FramePacer::with_clock(framerate, Arc::new(ManualClock::new(0)));
        let shared = Arc::new(SharedState::new(&geometry, pacer));
        let request = SurfaceRequest {
            title: "test".to_string(),
            width: 4,
            height: 2,
            source_width: 4,
            source_height: 2,
        };
        (shared, PlaneBuffers::new(&geometry), request)
    }

    #[test]
    fn test_start_attaches_handoff() {
        let (shared, _, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, rx) = watch::channel(LoopState::Starting);

        let presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0).expect("start");
        assert_eq!(*rx.borrow(), LoopState::Running);
        assert_eq!(presenter.state(), LoopState::Running);
        assert!(shared.handoff.is_attached());
        assert_eq!(shared.pacer.wanted_ticks(), None);
    }

    #[test]
    fn test_acquisition_failure_shuts_down() {
        let (shared, _, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        handle.fail_acquisition("no display");
        let (tx, rx) = watch::channel(LoopState::Starting);

        let result = PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0);
        assert!(matches!(result, Err(PresentError::Surface(_))));
        assert_eq!(*rx.borrow(), LoopState::Stopped);
        assert!(shared.signal.is_shutdown());
        assert!(!shared.handoff.is_attached());
    }

    #[test]
    fn test_poll_presents_pending_frame() {
        let (shared, mut planes, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, _rx) = watch::channel(LoopState::Starting);
        let mut presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0).expect("start");

        assert!(presenter.poll().expect("poll"));
        assert_eq!(handle.presents(), 0);
        assert_eq!(shared.pacer.wanted_ticks(), Some(0));

        planes.scanline_mut(0).y.fill(42);
        assert_eq!(shared.handoff.publish(&planes), PublishOutcome::Published);
        assert!(presenter.poll().expect("poll"));

        assert!(!shared.handoff.is_pending());
        assert_eq!(handle.presents(), 1);
        assert_eq!(handle.last_frame().expect("frame").y[..4], [42; 4]);
        assert_eq!(presenter.stats().frames_presented, 1);
        assert_eq!(presenter.stats().polls, 2);
    }

    #[test]
    fn test_update_failure_skips_frame() {
        let (shared, planes, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, _rx) = watch::channel(LoopState::Starting);
        let mut presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0).expect("start");

        handle.fail_next_updates(1);
        shared.handoff.publish(&planes);
        assert!(presenter.poll().expect("failure is not fatal"));
        assert_eq!(handle.presents(), 0);
        assert!(!shared.handoff.is_pending());

        shared.handoff.publish(&planes);
        assert!(presenter.poll().expect("poll"));
        assert_eq!(handle.presents(), 1);
        assert_eq!(presenter.stats().update_failures, 1);
    }

    #[test]
    fn test_update_failure_limit() {
        let (shared, planes, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, rx) = watch::channel(LoopState::Starting);
        let presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 1).expect("start");

        handle.fail_next_updates(1);
        shared.handoff.publish(&planes);

        let result = presenter.run();
        assert!(matches!(result, Err(PresentError::UpdateFailures(1))));
        assert_eq!(*rx.borrow(), LoopState::Stopped);
        assert!(shared.signal.is_shutdown());
        assert!(handle.is_released());
    }

    #[test]
    fn test_quit_tears_down() {
        let (shared, _, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, rx) = watch::channel(LoopState::Starting);
        let presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0).expect("start");

        handle.request_quit();
        let stats = presenter.run().expect("clean stop");
        assert_eq!(stats.polls, 0);
        assert_eq!(*rx.borrow(), LoopState::Stopped);
        assert!(shared.signal.is_shutdown());
        assert!(!shared.handoff.is_attached());
        assert!(handle.is_released());
    }

    #[test]
    fn test_producer_quit_request() {
        let (shared, _, request) = setup(0.0);
        let handle = MemorySurfaceHandle::new();
        let (tx, _rx) = watch::channel(LoopState::Starting);
        let mut presenter =
            PresentationLoop::start(handle.factory(), &request, Arc::clone(&shared), tx, 0).expect("start");

        shared.signal.request_quit();
        assert!(!presenter.poll().expect("poll"));
    }
}
