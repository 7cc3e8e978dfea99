//! State shared between the producer and consumer threads

use crate::geometry::FrameGeometry;
use crate::handoff::FrameHandoff;
use crate::pacer::FramePacer;
use crate::shutdown::ShutdownSignal;

/// Everything both threads touch, bundled behind one `Arc`
///
/// The consumer may outlive the producer-owning object, so nothing in here
/// refers back to it.
#[derive(Debug)]
pub struct SharedState {
    /// Single-slot frame mailbox
    pub handoff: FrameHandoff,

    /// Presentation schedule
    pub pacer: FramePacer,

    /// Quit request and shutdown acknowledgement
    pub signal: ShutdownSignal,
}

impl SharedState {
    /// Create shared state for a geometry and pacer
    pub fn new(geometry: &FrameGeometry, pacer: FramePacer) -> Self {
        Self {
            handoff: FrameHandoff::new(geometry),
            pacer,
            signal: ShutdownSignal::new(),
        }
    }
}
