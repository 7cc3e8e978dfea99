//! Shutdown flags shared by producer and consumer
//!
//! Two one-way flags:
//! - *quit requested*: raised by whoever wants the sink to stop (normally the
//!   producer-owning object when it is dropped). The consumer polls it.
//! - *shut down*: raised by the consumer once it leaves its running state.
//!   The producer checks it before every invocation and reports completion.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Quit request and shutdown acknowledgement
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    quit_requested: AtomicBool,
    shutdown: AtomicBool,
}

impl ShutdownSignal {
    /// Create a signal with both flags clear
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the consumer to stop
    pub fn request_quit(&self) {
        if !self.quit_requested.swap(true, Ordering::AcqRel) {
            debug!("Quit requested");
        }
    }

    /// Whether a quit has been requested
    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::Acquire)
    }

    /// Record that the consumer has stopped presenting
    pub fn mark_shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            debug!("Shutdown flag set");
        }
    }

    /// Whether the producer must stop accepting work
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}
