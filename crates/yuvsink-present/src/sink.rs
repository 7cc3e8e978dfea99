//! Video Sink
//!
//! [`VideoSink`] is the object a streaming host drives. It owns the producer
//! side (the [`FrameAssembler`]) and spawns the presentation thread at
//! construction. Both sides share one [`SharedState`] behind an `Arc`, so the
//! thread never refers back to the sink and may safely outlive it.
//!
//! # Shutdown
//!
//! Dropping the sink requests a quit, then waits up to
//! [`SinkConfig::shutdown_timeout_ms`] for the presentation thread to release
//! its surface. A thread that does not finish in time is detached and keeps
//! only the shared state alive.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};
use yuvsink_frame::{
    AssemblerStats, Clock, FrameAssembler, FrameGeometry, FramePacer, HandoffStats, MonotonicClock, SharedState,
    WorkStatus,
};

use crate::config::SinkConfig;
use crate::error::{PresentError, Result};
use crate::presenter::{run_presentation, LoopState, PresenterStats};
use crate::surface::{SurfaceFactory, SurfaceRequest};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Combined producer and handoff counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkStats {
    /// Producer counters
    pub assembler: AssemblerStats,
    /// Handoff counters
    pub handoff: HandoffStats,
    /// Smoothed presentation delay in milliseconds
    pub avg_delay_ms: f64,
    /// Presentation thread state
    pub state: LoopState,
}

/// Planar YUV video sink with paced presentation
#[derive(Debug)]
pub struct VideoSink {
    config: SinkConfig,
    assembler: FrameAssembler,
    shared: Arc<SharedState>,
    state_rx: watch::Receiver<LoopState>,
    consumer: Option<JoinHandle<Result<PresenterStats>>>,
}

impl VideoSink {
    /// Create a sink and start its presentation thread
    pub fn new<F: SurfaceFactory>(config: SinkConfig, factory: F) -> Result<Self> {
        Self::with_clock(config, factory, Arc::new(MonotonicClock::new()))
    }

    /// Create a sink whose pacing reads time from `clock`
    pub fn with_clock<F: SurfaceFactory>(config: SinkConfig, factory: F, clock: Arc<dyn Clock>) -> Result<Self> {
        if let Err(issues) = config.validate() {
            return Err(PresentError::invalid_config(issues.join("; ")));
        }
        let geometry = config.geometry()?;

        info!(
            "Creating video sink: {}x{} -> {}x{} at {} fps",
            geometry.width, geometry.height, geometry.dst_width, geometry.dst_height, config.framerate
        );

        let shared = Arc::new(SharedState::new(
            &geometry,
            FramePacer::with_clock(config.framerate, clock),
        ));
        let assembler = FrameAssembler::new(geometry, config.layout, Arc::clone(&shared));
        let (state_tx, state_rx) = watch::channel(LoopState::Starting);

        let request = SurfaceRequest {
            title: config.title.clone(),
            width: geometry.dst_width,
            height: geometry.dst_height,
            source_width: geometry.width,
            source_height: geometry.height,
        };
        let thread_shared = Arc::clone(&shared);
        let limit = config.update_failure_limit;

        let consumer = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run_presentation(factory, &request, thread_shared, state_tx, limit))?;

        Ok(Self {
            config,
            assembler,
            shared,
            state_rx,
            consumer: Some(consumer),
        })
    }

    /// Consume one input quantum of 1 to 3 synchronized planes
    ///
    /// Returns the samples consumed per plane, a multiple of
    /// [`chunk_size`](Self::chunk_size), or [`WorkStatus::Done`] once
    /// presentation has stopped.
    pub fn work(&mut self, inputs: &[&[u8]]) -> Result<WorkStatus> {
        Ok(self.assembler.work(inputs)?)
    }

    /// Preferred input quantum per plane, in samples
    pub fn chunk_size(&self) -> usize {
        self.assembler.chunk_size()
    }

    /// Source and presentation geometry
    pub fn geometry(&self) -> &FrameGeometry {
        self.assembler.geometry()
    }

    /// Configuration the sink was built with
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Current presentation thread state
    pub fn state(&self) -> LoopState {
        *self.state_rx.borrow()
    }

    /// Watch presentation thread state changes
    pub fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.state_rx.clone()
    }

    /// Whether presentation has stopped
    pub fn is_shutdown(&self) -> bool {
        self.shared.signal.is_shutdown()
    }

    /// Ask the presentation thread to stop without dropping the sink
    pub fn request_quit(&self) {
        self.shared.signal.request_quit();
    }

    /// Current counters
    pub fn stats(&self) -> SinkStats {
        SinkStats {
            assembler: self.assembler.stats(),
            handoff: self.shared.handoff.stats(),
            avg_delay_ms: self.shared.pacer.avg_delay(),
            state: self.state(),
        }
    }

    /// Stop presentation and wait for the thread
    ///
    /// Returns the presentation counters, or the error that ended the thread.
    pub fn shutdown(mut self) -> Result<PresenterStats> {
        self.shared.signal.request_quit();
        let timeout = self.config.shutdown_timeout_ms;
        match self.join_consumer(Duration::from_millis(timeout)) {
            Some(result) => result,
            None => Err(PresentError::ShutdownTimedOut(timeout)),
        }
    }

    /// Join the presentation thread if it finishes within `timeout`
    ///
    /// `None` means the thread was detached (or already joined).
    fn join_consumer(&mut self, timeout: Duration) -> Option<Result<PresenterStats>> {
        let handle = self.consumer.take()?;
        let deadline = Instant::now() + timeout;

        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "Presentation thread still running after {} ms, detaching",
                    timeout.as_millis()
                );
                return None;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        Some(handle.join().unwrap_or(Err(PresentError::ThreadPanicked)))
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        self.shared.signal.request_quit();

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        match self.join_consumer(timeout) {
            Some(Ok(stats)) => debug!("Presentation thread joined: {:?}", stats),
            Some(Err(e)) => warn!("Presentation thread ended with error: {}", e),
            None => {}
        }
    }
}
