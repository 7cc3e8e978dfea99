//! Canonical three-plane frame storage
//!
//! Every plane holds `width * height` samples with a stride of `width`,
//! including the chroma planes. Sub-sampled chroma only occupies the first
//! half of each chroma row.

use crate::geometry::FrameGeometry;

/// Mid-grey sample value used before any input arrives
pub const NEUTRAL_SAMPLE: u8 = 128;

/// Identifies one of the three canonical planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Luma
    Y,
    /// First chroma plane
    U,
    /// Second chroma plane
    V,
}

/// Full-frame luma and chroma planes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneBuffers {
    width: usize,
    height: usize,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

/// Mutable rows of the three planes at one scanline
#[derive(Debug)]
pub struct ScanlineMut<'a> {
    /// Luma row (`width` samples)
    pub y: &'a mut [u8],
    /// First chroma row (`width` samples)
    pub u: &'a mut [u8],
    /// Second chroma row (`width` samples)
    pub v: &'a mut [u8],
}

impl PlaneBuffers {
    /// Allocate planes for a geometry, cleared to [`NEUTRAL_SAMPLE`]
    pub fn new(geometry: &FrameGeometry) -> Self {
        let len = geometry.plane_len();
        Self {
            width: geometry.row_len(),
            height: geometry.height as usize,
            y: vec![NEUTRAL_SAMPLE; len],
            u: vec![NEUTRAL_SAMPLE; len],
            v: vec![NEUTRAL_SAMPLE; len],
        }
    }

    /// Samples per row in every plane
    pub fn stride(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to a plane
    pub fn plane(&self, plane: Plane) -> &[u8] {
        match plane {
            Plane::Y => &self.y,
            Plane::U => &self.u,
            Plane::V => &self.v,
        }
    }

    /// Borrow the rows of scanline `line`
    ///
    /// # Panics
    ///
    /// Panics if `line >= height`.
    pub fn scanline_mut(&mut self, line: usize) -> ScanlineMut<'_> {
        let range = line * self.width..(line + 1) * self.width;
        ScanlineMut {
            y: &mut self.y[range.clone()],
            u: &mut self.u[range.clone()],
            v: &mut self.v[range],
        }
    }

    /// Overwrite all three planes with the contents of `other`
    ///
    /// Both buffers must come from the same geometry.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.y.len(), other.y.len(), "plane geometry mismatch");
        self.y.copy_from_slice(&other.y);
        self.u.copy_from_slice(&other.u);
        self.v.copy_from_slice(&other.v);
    }

    /// Borrow the planes as a presentable frame
    pub fn as_frame(&self) -> PlanarFrame<'_> {
        PlanarFrame {
            y: &self.y,
            u: &self.u,
            v: &self.v,
            stride: self.width,
            width: self.width,
            height: self.height,
        }
    }
}

/// Borrowed planar frame, as handed to a presentation surface
#[derive(Debug, Clone, Copy)]
pub struct PlanarFrame<'a> {
    /// Luma plane
    pub y: &'a [u8],
    /// First chroma plane
    pub u: &'a [u8],
    /// Second chroma plane
    pub v: &'a [u8],
    /// Row stride shared by all planes
    pub stride: usize,
    /// Source width
    pub width: usize,
    /// Source height
    pub height: usize,
}
