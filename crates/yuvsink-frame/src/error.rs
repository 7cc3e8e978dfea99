//! Error types for frame assembly
//!
//! Provides typed errors that streaming hosts can match and handle specifically.

use thiserror::Error;

/// Errors raised on the producer side of the sink
///
/// Every variant except [`FrameError::ShortPlane`] is a configuration error:
/// once returned by [`FrameAssembler::work`](crate::FrameAssembler::work) the
/// assembler halts and refuses further input.
///
/// # Examples
///
/// ```
/// use yuvsink_frame::{ChannelLayout, FrameError};
///
/// match ChannelLayout::from_channel_count(4) {
///     Ok(layout) => println!("layout: {:?}", layout),
///     Err(FrameError::UnsupportedChannelCount(count)) => {
///         eprintln!("cannot assemble frames from {} channels", count);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The streaming host offered a channel count outside 1..=3
    #[error("Wrong number of channels: 1, 2 or 3 channels are supported, got {0}")]
    UnsupportedChannelCount(usize),

    /// The channel count changed after the layout was selected
    #[error("Channel count mismatch: layout expects {expected} channels, got {actual}")]
    ChannelMismatch {
        /// Channels required by the selected layout
        expected: usize,
        /// Channels supplied by the host
        actual: usize,
    },

    /// An input plane is shorter than the span being consumed
    ///
    /// Not fatal: the call consumes nothing and may be retried.
    #[error("Input plane {index} holds {len} samples, need at least {needed}")]
    ShortPlane {
        /// Index of the offending plane
        index: usize,
        /// Samples supplied
        len: usize,
        /// Samples required
        needed: usize,
    },

    /// Frame geometry is unusable
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The assembler previously hit a configuration error
    #[error("Frame assembler halted after a configuration error")]
    Halted,
}

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    /// Create an invalid geometry error
    pub(crate) fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Whether this error halts the assembler
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ShortPlane { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::UnsupportedChannelCount(4);
        assert_eq!(
            err.to_string(),
            "Wrong number of channels: 1, 2 or 3 channels are supported, got 4"
        );

        let err = FrameError::invalid_geometry("width must be positive");
        assert_eq!(err.to_string(), "Invalid geometry: width must be positive");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(FrameError::UnsupportedChannelCount(0).is_fatal());
        assert!(FrameError::ChannelMismatch { expected: 3, actual: 2 }.is_fatal());
        assert!(!FrameError::ShortPlane { index: 1, len: 10, needed: 20 }.is_fatal());
    }
}
