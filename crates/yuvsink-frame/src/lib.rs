//! # yuvsink-frame
//!
//! Producer-side engine of the [yuvsink](https://github.com/yuvsink/yuvsink)
//! workspace: turns a stream of raw 8-bit planes into complete planar YUV
//! frames and hands them to a concurrently running presenter.
//!
//! # Features
//!
//! - **Layout Conversion**: 3-channel planar, 2-channel Y + interleaved UV,
//!   and 1-channel grey input, selected once per sink
//! - **Chunked Assembly**: Arbitrary input quanta reassembled scanline by
//!   scanline with a wrapping cursor
//! - **Single-Slot Handoff**: At most one pending frame, drop-if-busy, the
//!   producer never blocks
//! - **Frame Pacing**: Absolute schedule with an exponentially smoothed delay
//!   hint for the consumer
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use yuvsink_frame::{FrameAssembler, FrameGeometry, FramePacer, SharedState, WorkStatus};
//!
//! let geometry = FrameGeometry::new(320, 240)?;
//! let shared = Arc::new(SharedState::new(&geometry, FramePacer::new(30.0)));
//! let mut assembler = FrameAssembler::new(geometry, None, Arc::clone(&shared));
//!
//! // Normally done by the presentation loop once its surface exists
//! shared.handoff.attach();
//!
//! // Five chunks of 51 scanlines complete one 240-line frame
//! let luma = vec![16u8; geometry.chunk_size() * 5];
//! let status = assembler.work(&[&luma])?;
//! assert_eq!(status, WorkStatus::Produced(geometry.chunk_size() * 5));
//!
//! if let Some(frame) = shared.handoff.take() {
//!     assert_eq!(frame.stride(), 320);
//! }
//! # Ok::<(), yuvsink_frame::FrameError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//!  streaming host ──► FrameAssembler ──► FrameHandoff ──► presenter
//!                     (PlaneConverter)   (pending flag)
//!                            │
//!                            └──────► FramePacer ◄──────── presenter
//!                                     (delay hint)
//! ```
//!
//! The assembler runs on the producer thread and the presenter on its own
//! thread. They share a [`SharedState`] and nothing else.

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod assembler;
pub mod converter;
pub mod error;
pub mod geometry;
pub mod handoff;
pub mod pacer;
pub mod planes;
pub mod shared;
pub mod shutdown;

// =============================================================================
// RE-EXPORTS - PRIMARY API
// =============================================================================

pub use assembler::{AssemblerStats, FrameAssembler, WorkStatus};
pub use converter::{ChannelLayout, PlaneConverter, MAX_CHANNELS, MIN_CHANNELS};
pub use error::{FrameError, Result};
pub use geometry::{FrameGeometry, MAX_CHUNK_SAMPLES};
pub use handoff::{FrameHandoff, HandoffStats, PendingFrame, PublishOutcome};
pub use pacer::{Clock, FramePacer, ManualClock, MonotonicClock, MAX_FRAMETIME_MS, SMOOTHING_ALPHA};
pub use planes::{Plane, PlanarFrame, PlaneBuffers, NEUTRAL_SAMPLE};
pub use shared::SharedState;
pub use shutdown::ShutdownSignal;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
