//! # yuvsink-present
//!
//! Paced presentation of planar YUV frames assembled by `yuvsink-frame`.
//!
//! A [`VideoSink`] accepts scanline chunks on the caller's thread and shows
//! completed frames on a dedicated presentation thread, at most one frame in
//! flight between them. The window itself sits behind the
//! [`PresentationSurface`] trait; [`MemorySurface`] is the built-in headless
//! backend.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use yuvsink_present::{MemorySurfaceHandle, SinkConfig, VideoSink, WorkStatus};
//!
//! # fn main() -> yuvsink_present::Result<()> {
//! let config = SinkConfig::builder().framerate(25.0).size(320, 240).build();
//! let surface = MemorySurfaceHandle::new();
//! let mut sink = VideoSink::new(config, surface.factory())?;
//!
//! let y = vec![16u8; sink.chunk_size()];
//! let u = vec![128u8; sink.chunk_size()];
//! let v = vec![128u8; sink.chunk_size()];
//! while let WorkStatus::Produced(_) = sink.work(&[&y, &u, &v])? {
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threads
//!
//! ```text
//! ┌───────────────┐  publish   ┌──────────────┐  take   ┌───────────────────┐
//! │ VideoSink     │ ─────────▶ │ FrameHandoff │ ──────▶ │ PresentationLoop  │
//! │ (host thread) │  drop if   │ (one slot)   │         │ (own thread)      │
//! └───────────────┘  busy      └──────────────┘         └───────────────────┘
//!         │                                                      │
//!         └──────── FramePacer / ShutdownSignal (shared) ────────┘
//! ```
//!
//! Lifecycle changes of the presentation thread are observable through
//! [`VideoSink::subscribe`], a `tokio::sync::watch` receiver.

pub mod config;
pub mod error;
pub mod memory;
pub mod presenter;
pub mod sink;
pub mod surface;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{SinkConfig, SinkConfigBuilder};
pub use error::{PresentError, Result, SurfaceError};
pub use memory::{CapturedFrame, MemorySurface, MemorySurfaceFactory, MemorySurfaceHandle};
pub use presenter::{run_presentation, LoopState, PresentationLoop, PresenterStats};
pub use sink::{SinkStats, VideoSink};
pub use surface::{PresentationSurface, SurfaceFactory, SurfaceRequest};

pub use yuvsink_frame::{ChannelLayout, PlanarFrame, WorkStatus, MAX_CHANNELS, MIN_CHANNELS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_terminal() {
        assert!(!LoopState::Starting.is_terminal());
        assert!(!LoopState::Running.is_terminal());
        assert!(LoopState::TearingDown.is_terminal());
        assert!(LoopState::Stopped.is_terminal());
    }
}
