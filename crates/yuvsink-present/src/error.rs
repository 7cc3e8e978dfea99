//! Error types for presentation
//!
//! Producer-side failures are returned from [`VideoSink`](crate::VideoSink)
//! calls. Consumer-side failures end the presentation thread; they are logged
//! there and surfaced again when the sink joins the thread.

use thiserror::Error;
use yuvsink_frame::FrameError;

/// Errors reported by a presentation surface backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Window, renderer or texture could not be created
    ///
    /// Fatal to the presentation loop: it never enters the running state.
    #[error("Couldn't create presentation surface: {0}")]
    Acquisition(String),

    /// A single frame upload failed
    ///
    /// Transient: the frame is skipped and the previous one stays on screen.
    #[error("Couldn't update planar frame: {0}")]
    Update(String),
}

impl SurfaceError {
    /// Create an acquisition error
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Create an update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }
}

/// Errors that can occur while running a video sink
#[derive(Error, Debug)]
pub enum PresentError {
    /// Frame assembly rejected the input or configuration
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The presentation surface failed
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Invalid sink configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The presentation thread could not be started
    #[error("Failed to spawn presentation thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// The presentation thread panicked
    #[error("Presentation thread panicked")]
    ThreadPanicked,

    /// Too many frame uploads failed back to back
    #[error("Presentation stopped after {0} consecutive update failures")]
    UpdateFailures(u32),

    /// The presentation thread did not stop in time and was detached
    #[error("Presentation thread still running after {0} ms, detached")]
    ShutdownTimedOut(u64),
}

/// Result type for presentation operations
pub type Result<T> = std::result::Result<T, PresentError>;

impl PresentError {
    /// Create an invalid config error
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
