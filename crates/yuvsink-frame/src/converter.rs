//! Scanline Plane Conversion
//!
//! Converts one scanline of a multi-channel input layout into the three
//! canonical planes.
//!
//! # Supported Layouts
//!
//! | Channels | Layout | Behaviour |
//! |----------|--------|-----------|
//! | 3 | [`ChannelLayout::Planar3`] | Y copied; `width/2` samples copied to U and V |
//! | 2 | [`ChannelLayout::Biplanar2`] | Y copied; interleaved UV split (even → U, odd → V) |
//! | 1 | [`ChannelLayout::Mono1`] | Y copied; chroma rows left untouched |
//!
//! The layout is chosen once and carries its conversion function, so the
//! per-scanline path never re-dispatches on the channel count.
//!
//! # Examples
//!
//! ```
//! use yuvsink_frame::{ChannelLayout, FrameGeometry, PlaneBuffers, PlaneConverter};
//!
//! let geometry = FrameGeometry::new(4, 1)?;
//! let mut planes = PlaneBuffers::new(&geometry);
//! let converter = PlaneConverter::new(ChannelLayout::Biplanar2);
//!
//! let luma = [16, 17, 18, 19];
//! let chroma = [1, 2, 3, 4];
//! converter.convert(&[&luma, &chroma], planes.scanline_mut(0));
//! # Ok::<(), yuvsink_frame::FrameError>(())
//! ```

use crate::error::{FrameError, Result};
use crate::planes::ScanlineMut;

/// Smallest channel count a streaming host may offer
pub const MIN_CHANNELS: usize = 1;

/// Largest channel count a streaming host may offer
pub const MAX_CHANNELS: usize = 3;

/// Input channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Independent Y, U and V inputs
    Planar3,
    /// Y plus an interleaved UV input
    Biplanar2,
    /// Y only
    Mono1,
}

impl ChannelLayout {
    /// Select the layout for a channel count
    pub fn from_channel_count(count: usize) -> Result<Self> {
        match count {
            3 => Ok(Self::Planar3),
            2 => Ok(Self::Biplanar2),
            1 => Ok(Self::Mono1),
            other => Err(FrameError::UnsupportedChannelCount(other)),
        }
    }

    /// Number of input planes this layout consumes
    pub const fn channel_count(self) -> usize {
        match self {
            Self::Planar3 => 3,
            Self::Biplanar2 => 2,
            Self::Mono1 => 1,
        }
    }
}

/// Per-scanline conversion routine
///
/// `src` holds exactly one row per input channel, each `dst.y.len()` long.
pub type ConvertFn = fn(src: &[&[u8]], dst: ScanlineMut<'_>);

/// A channel layout bound to its conversion routine
#[derive(Clone, Copy)]
pub struct PlaneConverter {
    layout: ChannelLayout,
    convert: ConvertFn,
}

impl std::fmt::Debug for PlaneConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaneConverter")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl PlaneConverter {
    /// Bind a layout to its conversion routine
    pub fn new(layout: ChannelLayout) -> Self {
        let convert: ConvertFn = match layout {
            ChannelLayout::Planar3 => copy_planar,
            ChannelLayout::Biplanar2 => split_interleaved_chroma,
            ChannelLayout::Mono1 => copy_luma,
        };
        Self { layout, convert }
    }

    /// Layout handled by this converter
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Convert one scanline
    #[inline]
    pub fn convert(&self, src: &[&[u8]], dst: ScanlineMut<'_>) {
        debug_assert_eq!(src.len(), self.layout.channel_count());
        (self.convert)(src, dst);
    }
}

fn copy_planar(src: &[&[u8]], dst: ScanlineMut<'_>) {
    let width = dst.y.len();
    let half = width / 2;
    dst.y.copy_from_slice(&src[0][..width]);
    dst.u[..half].copy_from_slice(&src[1][..half]);
    dst.v[..half].copy_from_slice(&src[2][..half]);
}

fn split_interleaved_chroma(src: &[&[u8]], dst: ScanlineMut<'_>) {
    let width = dst.y.len();
    dst.y.copy_from_slice(&src[0][..width]);

    // A trailing odd sample has no partner and is ignored
    for (k, pair) in src[1][..width].chunks_exact(2).enumerate() {
        dst.u[k] = pair[0];
        dst.v[k] = pair[1];
    }
}

fn copy_luma(src: &[&[u8]], dst: ScanlineMut<'_>) {
    let width = dst.y.len();
    dst.y.copy_from_slice(&src[0][..width]);
}
