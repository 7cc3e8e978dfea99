//! # yuvsink
//!
//! Planar YUV frame assembly and paced presentation for raw pixel streams.
//!
//! A streaming host hands the sink synchronized scanline chunks of one to
//! three sample planes. The sink reassembles them into full planar frames and
//! shows the frames on a dedicated presentation thread at a target frame
//! rate, dropping frames rather than queueing them when presentation falls
//! behind.
//!
//! - **[`frame`]** - Plane conversion, frame assembly, single-slot handoff and pacing
//! - **[`present`]** - Presentation loop, surface traits and the threaded `VideoSink`
//!
//! # Features
//!
//! Both features are enabled by default. The assembly core builds without the
//! presentation thread:
//!
//! ```toml
//! # Everything (default)
//! yuvsink = "0.1"
//!
//! # Frame assembly and pacing only
//! yuvsink = { version = "0.1", default-features = false, features = ["frame"] }
//! ```
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `frame` | Yes | Frame assembly, handoff and pacing |
//! | `present` | Yes | Presentation thread and `VideoSink` |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use yuvsink::prelude::*;
//!
//! # fn main() -> yuvsink::present::Result<()> {
//! let config = SinkConfig::builder()
//!     .framerate(30.0)
//!     .size(640, 480)
//!     .layout(ChannelLayout::Planar3)
//!     .build();
//!
//! let surface = MemorySurfaceHandle::new();
//! let mut sink = VideoSink::new(config, surface.factory())?;
//!
//! let quantum = sink.chunk_size();
//! let (y, u, v) = (vec![16u8; quantum], vec![128u8; quantum], vec![128u8; quantum]);
//! match sink.work(&[&y, &u, &v])? {
//!     WorkStatus::Produced(n) => println!("consumed {} samples per plane", n),
//!     WorkStatus::Done => println!("presentation stopped"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           yuvsink                            │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │        yuvsink-frame         │        yuvsink-present        │
//! │                              │                               │
//! │  PlaneConverter              │  VideoSink                    │
//! │  FrameAssembler              │  PresentationLoop             │
//! │  FrameHandoff                │  PresentationSurface          │
//! │  FramePacer                  │  SinkConfig                   │
//! └──────────────┬───────────────┴───────────────┬───────────────┘
//!                │                               │
//!                ▼                               ▼
//!        host scanline chunks            window / texture backend
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// RE-EXPORTS
// =============================================================================

/// Scanline plane conversion, frame assembly, single-slot handoff and pacing.
///
/// See [`yuvsink_frame`] documentation for details.
#[cfg(feature = "frame")]
#[cfg_attr(docsrs, doc(cfg(feature = "frame")))]
pub use yuvsink_frame as frame;

/// Paced presentation on a dedicated thread.
///
/// See [`yuvsink_present`] documentation for details.
#[cfg(feature = "present")]
#[cfg_attr(docsrs, doc(cfg(feature = "present")))]
pub use yuvsink_present as present;

// =============================================================================
// PRELUDE - Common types for convenience
// =============================================================================

/// Prelude module with commonly used types.
///
/// ```rust
/// use yuvsink::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "frame")]
    pub use yuvsink_frame::{ChannelLayout, FrameAssembler, FrameError, FrameGeometry, FramePacer, WorkStatus};

    #[cfg(feature = "present")]
    pub use yuvsink_present::{
        LoopState, MemorySurfaceHandle, PresentError, PresentationSurface, SinkConfig, SurfaceFactory, VideoSink,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    #[cfg(feature = "frame")]
    fn test_frame_reexport() {
        let geometry = frame::FrameGeometry::new(320, 240).expect("geometry");
        assert_eq!(geometry.chunk_size(), 320 * 51);
    }

    #[test]
    #[cfg(feature = "present")]
    fn test_present_reexport() {
        assert!(present::SinkConfig::default().validate().is_ok());
    }
}
