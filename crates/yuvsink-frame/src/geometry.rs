//! Frame geometry and input quantum
//!
//! Source geometry is what the streaming host delivers; destination geometry
//! is what the presentation surface is created with. The two are independent.

use crate::error::{FrameError, Result};

/// Upper bound on samples handled per assembly step
///
/// The chunk size is the largest whole number of scanlines that fits in this
/// many samples (but never less than one scanline).
pub const MAX_CHUNK_SAMPLES: usize = 16384;

/// Source and presentation dimensions of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Source width in samples per scanline
    pub width: u32,

    /// Source height in scanlines
    pub height: u32,

    /// Presentation surface width
    pub dst_width: u32,

    /// Presentation surface height
    pub dst_height: u32,
}

impl FrameGeometry {
    /// Create geometry whose presentation size matches the source
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 {
            return Err(FrameError::invalid_geometry("width must be positive"));
        }
        if height == 0 {
            return Err(FrameError::invalid_geometry("height must be positive"));
        }

        Ok(Self {
            width,
            height,
            dst_width: width,
            dst_height: height,
        })
    }

    /// Create geometry from signed construction parameters
    ///
    /// Negative destination dimensions fall back to the source dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use yuvsink_frame::FrameGeometry;
    ///
    /// let geometry = FrameGeometry::from_signed(320, 240, -1, 480)?;
    /// assert_eq!((geometry.dst_width, geometry.dst_height), (320, 480));
    /// # Ok::<(), yuvsink_frame::FrameError>(())
    /// ```
    pub fn from_signed(width: i32, height: i32, dst_width: i32, dst_height: i32) -> Result<Self> {
        let width = u32::try_from(width)
            .map_err(|_| FrameError::invalid_geometry(format!("width {} is negative", width)))?;
        let height = u32::try_from(height)
            .map_err(|_| FrameError::invalid_geometry(format!("height {} is negative", height)))?;

        Self::new(width, height)?
            .with_destination(u32::try_from(dst_width).ok(), u32::try_from(dst_height).ok())
    }

    /// Override the presentation size
    ///
    /// `None` keeps the source dimension for that axis.
    pub fn with_destination(mut self, dst_width: Option<u32>, dst_height: Option<u32>) -> Result<Self> {
        self.dst_width = dst_width.unwrap_or(self.width);
        self.dst_height = dst_height.unwrap_or(self.height);

        if self.dst_width == 0 || self.dst_height == 0 {
            return Err(FrameError::invalid_geometry(format!(
                "destination {}x{} must be non-empty",
                self.dst_width, self.dst_height
            )));
        }

        Ok(self)
    }

    /// Samples per scanline
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize
    }

    /// Samples per full plane
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Scanlines handled per assembly step
    pub fn chunk_lines(&self) -> usize {
        (MAX_CHUNK_SAMPLES / self.row_len()).max(1)
    }

    /// Required input quantum in samples
    ///
    /// Streaming hosts should deliver whole multiples of this value.
    pub fn chunk_size(&self) -> usize {
        self.chunk_lines() * self.row_len()
    }
}
