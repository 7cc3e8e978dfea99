//! Frame Assembly
//!
//! Drives the [`PlaneConverter`] across each input quantum, tracks the
//! current scanline, and hands every completed frame to the
//! [`FrameHandoff`](crate::FrameHandoff) and [`FramePacer`](crate::FramePacer).
//!
//! # Input Quantum
//!
//! The streaming host supplies 1 to 3 synchronized planes per call. The
//! length of the first plane is the quantum; it is consumed in whole chunks
//! of [`FrameGeometry::chunk_size`] samples. A trailing partial chunk is left
//! for the next call and the returned count says how much was consumed.
//!
//! # Frame Completion
//!
//! The cursor wraps to zero exactly when `height` scanlines have been
//! written. On every wrap the frame is offered to the handoff (dropped if a
//! frame is still pending or no surface is attached) and the pacing schedule
//! advances regardless, so pacing never stalls behind a slow consumer.

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::converter::{ChannelLayout, PlaneConverter, MAX_CHANNELS};
use crate::error::{FrameError, Result};
use crate::geometry::FrameGeometry;
use crate::handoff::PublishOutcome;
use crate::planes::PlaneBuffers;
use crate::shared::SharedState;

/// Outcome of one producer invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Samples consumed from each input plane
    Produced(usize),
    /// The sink has shut down; no input was consumed
    Done,
}

/// Assembler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Scanlines converted
    pub scanlines: u64,
    /// Frames completed (cursor wraps)
    pub frames_completed: u64,
    /// Completed frames handed to the consumer
    pub frames_published: u64,
    /// Completed frames dropped because one was pending
    pub frames_dropped_busy: u64,
    /// Completed frames dropped because no surface was attached
    pub frames_dropped_detached: u64,
    /// Samples consumed per input plane
    pub samples_consumed: u64,
}

/// Reassembles scanline chunks into full planar frames
#[derive(Debug)]
pub struct FrameAssembler {
    geometry: FrameGeometry,
    converter: Option<PlaneConverter>,
    planes: PlaneBuffers,
    cursor: usize,
    halted: bool,
    shared: Arc<SharedState>,
    stats: AssemblerStats,
}

impl FrameAssembler {
    /// Create an assembler
    ///
    /// With `layout` set to `None` the layout is picked from the channel
    /// count of the first [`work`](Self::work) call.
    pub fn new(geometry: FrameGeometry, layout: Option<ChannelLayout>, shared: Arc<SharedState>) -> Self {
        debug!(
            "Frame assembler {}x{}, chunk {} samples ({} lines), layout {:?}",
            geometry.width,
            geometry.height,
            geometry.chunk_size(),
            geometry.chunk_lines(),
            layout
        );

        Self {
            planes: PlaneBuffers::new(&geometry),
            geometry,
            converter: layout.map(PlaneConverter::new),
            cursor: 0,
            halted: false,
            shared,
            stats: AssemblerStats::default(),
        }
    }

    /// Consume one input quantum
    ///
    /// Returns [`WorkStatus::Done`] without touching the input once the sink
    /// has shut down. Configuration errors halt the assembler.
    pub fn work(&mut self, inputs: &[&[u8]]) -> Result<WorkStatus> {
        if self.shared.signal.is_shutdown() {
            return Ok(WorkStatus::Done);
        }
        if self.halted {
            return Err(FrameError::Halted);
        }

        let converter = match self.select_converter(inputs.len()) {
            Ok(converter) => converter,
            Err(e) => {
                error!("{}", e);
                self.halted = true;
                return Err(e);
            }
        };

        let chunk = self.geometry.chunk_size();
        let quantum = inputs.first().map_or(0, |plane| plane.len());
        let span = quantum - quantum % chunk;

        for (index, plane) in inputs.iter().enumerate() {
            if plane.len() < span {
                return Err(FrameError::ShortPlane {
                    index,
                    len: plane.len(),
                    needed: span,
                });
            }
        }

        let mut produced = 0;
        for offset in (0..span).step_by(chunk) {
            produced += self.process_chunk(&converter, inputs, offset);
        }

        self.stats.samples_consumed += produced as u64;
        Ok(WorkStatus::Produced(produced))
    }

    fn select_converter(&mut self, channels: usize) -> Result<PlaneConverter> {
        match self.converter {
            Some(converter) => {
                let expected = converter.layout().channel_count();
                if channels == expected {
                    Ok(converter)
                } else {
                    Err(FrameError::ChannelMismatch {
                        expected,
                        actual: channels,
                    })
                }
            }
            None => {
                let converter = PlaneConverter::new(ChannelLayout::from_channel_count(channels)?);
                debug!("Selected {:?} layout for {} channels", converter.layout(), channels);
                self.converter = Some(converter);
                Ok(converter)
            }
        }
    }

    fn process_chunk(&mut self, converter: &PlaneConverter, inputs: &[&[u8]], offset: usize) -> usize {
        let width = self.geometry.row_len();
        let height = self.geometry.height as usize;
        let channels = inputs.len();

        let mut rows: [&[u8]; MAX_CHANNELS] = [&[]; MAX_CHANNELS];
        let mut produced = 0;

        for line in 0..self.geometry.chunk_lines() {
            let start = offset + line * width;
            for (row, plane) in rows.iter_mut().zip(inputs) {
                *row = &plane[start..start + width];
            }

            converter.convert(&rows[..channels], self.planes.scanline_mut(self.cursor));

            produced += width;
            self.stats.scanlines += 1;
            self.cursor += 1;
            if self.cursor >= height {
                self.cursor = 0;
                self.complete_frame();
            }
        }

        produced
    }

    fn complete_frame(&mut self) {
        self.stats.frames_completed += 1;

        match self.shared.handoff.publish(&self.planes) {
            PublishOutcome::Published => self.stats.frames_published += 1,
            PublishOutcome::Busy => self.stats.frames_dropped_busy += 1,
            PublishOutcome::Detached => self.stats.frames_dropped_detached += 1,
        }

        let avg_delay = self.shared.pacer.frame_completed();
        trace!(
            "Frame {} complete, avg delay {:.2} ms",
            self.stats.frames_completed,
            avg_delay
        );
    }

    /// Current scanline
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Frame being assembled
    pub fn planes(&self) -> &PlaneBuffers {
        &self.planes
    }

    /// Selected layout, once known
    pub fn layout(&self) -> Option<ChannelLayout> {
        self.converter.map(|converter| converter.layout())
    }

    /// Source and presentation geometry
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Required input quantum in samples
    pub fn chunk_size(&self) -> usize {
        self.geometry.chunk_size()
    }

    /// Whether a configuration error stopped the assembler
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Snapshot of the assembler counters
    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }
}
