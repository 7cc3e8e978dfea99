//! In-memory presentation surface
//!
//! [`MemorySurface`] keeps the last uploaded frame in memory instead of on a
//! screen. It backs headless runs and lets tests inspect what was presented
//! through a cloneable [`MemorySurfaceHandle`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use yuvsink_frame::PlanarFrame;

use crate::error::SurfaceError;
use crate::surface::{PresentationSurface, SurfaceFactory, SurfaceRequest};

/// Owned copy of an uploaded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Luma plane
    pub y: Vec<u8>,
    /// First chroma plane
    pub u: Vec<u8>,
    /// Second chroma plane
    pub v: Vec<u8>,
    /// Row stride shared by all planes
    pub stride: usize,
    /// Frame height
    pub height: usize,
}

impl CapturedFrame {
    fn from_frame(frame: PlanarFrame<'_>) -> Self {
        Self {
            y: frame.y.to_vec(),
            u: frame.u.to_vec(),
            v: frame.v.to_vec(),
            stride: frame.stride,
            height: frame.height,
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    request: Option<SurfaceRequest>,
    acquire_error: Option<String>,
    last_frame: Option<CapturedFrame>,
    back_buffer: Option<CapturedFrame>,
    updates: u64,
    presents: u64,
    failed_updates: u64,
    fail_updates: u32,
    quit: bool,
    released: bool,
}

/// Shared view of a [`MemorySurface`]
///
/// Cloneable and usable from any thread, also after the surface is gone.
#[derive(Debug, Clone, Default)]
pub struct MemorySurfaceHandle {
    state: Arc<Mutex<SurfaceState>>,
}

impl MemorySurfaceHandle {
    /// Create a handle for a surface that does not exist yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next surface acquisition fail with `reason`
    pub fn fail_acquisition(&self, reason: impl Into<String>) {
        self.state.lock().acquire_error = Some(reason.into());
    }

    /// Make the next `count` frame uploads fail
    pub fn fail_next_updates(&self, count: u32) {
        self.state.lock().fail_updates = count;
    }

    /// Simulate the user closing the window
    pub fn request_quit(&self) {
        self.state.lock().quit = true;
    }

    /// Request the surface was acquired with, if any
    pub fn request(&self) -> Option<SurfaceRequest> {
        self.state.lock().request.clone()
    }

    /// Whether the surface has been acquired
    pub fn is_acquired(&self) -> bool {
        self.state.lock().request.is_some()
    }

    /// Whether the surface has been released
    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Most recently presented frame
    pub fn last_frame(&self) -> Option<CapturedFrame> {
        self.state.lock().last_frame.clone()
    }

    /// Number of successful uploads
    pub fn updates(&self) -> u64 {
        self.state.lock().updates
    }

    /// Number of failed uploads
    pub fn failed_updates(&self) -> u64 {
        self.state.lock().failed_updates
    }

    /// Number of presents
    pub fn presents(&self) -> u64 {
        self.state.lock().presents
    }

    /// Factory that builds a surface reporting into this handle
    pub fn factory(&self) -> MemorySurfaceFactory {
        MemorySurfaceFactory {
            state: Arc::clone(&self.state),
        }
    }
}

/// [`SurfaceFactory`] for [`MemorySurface`]
#[derive(Debug)]
pub struct MemorySurfaceFactory {
    state: Arc<Mutex<SurfaceState>>,
}

impl SurfaceFactory for MemorySurfaceFactory {
    type Surface = MemorySurface;

    fn create_surface(self, request: &SurfaceRequest) -> Result<MemorySurface, SurfaceError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.acquire_error.take() {
            return Err(SurfaceError::Acquisition(reason));
        }

        debug!(
            "Memory surface \"{}\" {}x{} (texture {}x{})",
            request.title, request.width, request.height, request.source_width, request.source_height
        );
        state.request = Some(request.clone());
        drop(state);

        Ok(MemorySurface { state: self.state })
    }
}

/// Presentation surface that keeps frames in memory
#[derive(Debug)]
pub struct MemorySurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl PresentationSurface for MemorySurface {
    fn update_planar_frame(&mut self, frame: PlanarFrame<'_>) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        if state.fail_updates > 0 {
            state.fail_updates -= 1;
            state.failed_updates += 1;
            return Err(SurfaceError::update("injected upload failure"));
        }

        state.back_buffer = Some(CapturedFrame::from_frame(frame));
        state.updates += 1;
        Ok(())
    }

    fn present(&mut self) {
        let mut state = self.state.lock();
        if let Some(frame) = state.back_buffer.take() {
            state.last_frame = Some(frame);
        }
        state.presents += 1;
        trace!("Memory surface present #{}", state.presents);
    }

    fn quit_requested(&mut self) -> bool {
        self.state.lock().quit
    }
}

impl Drop for MemorySurface {
    fn drop(&mut self) {
        self.state.lock().released = true;
        debug!("Memory surface released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yuvsink_frame::{FrameGeometry, PlaneBuffers};

    fn request() -> SurfaceRequest {
        SurfaceRequest {
            title: "test".to_string(),
            width: 8,
            height: 4,
            source_width: 4,
            source_height: 2,
        }
    }

    #[test]
    fn test_acquire_and_present() {
        let handle = MemorySurfaceHandle::new();
        let mut surface = handle.factory().create_surface(&request()).expect("surface");
        assert!(handle.is_acquired());
        assert_eq!(handle.request().map(|r| r.width), Some(8));

        let planes = PlaneBuffers::new(&FrameGeometry::new(4, 2).expect("geometry"));
        surface.update_planar_frame(planes.as_frame()).expect("update");
        assert!(handle.last_frame().is_none());

        surface.present();
        let frame = handle.last_frame().expect("presented frame");
        assert_eq!(frame.y.len(), 8);
        assert_eq!(frame.stride, 4);
        assert_eq!(handle.presents(), 1);

        drop(surface);
        assert!(handle.is_released());
    }

    #[test]
    fn test_injected_failures() {
        let handle = MemorySurfaceHandle::new();
        handle.fail_acquisition("no display");
        let err = handle.factory().create_surface(&request()).expect_err("acquisition fails");
        assert_eq!(err, SurfaceError::Acquisition("no display".to_string()));

        let mut surface = handle.factory().create_surface(&request()).expect("second attempt");
        handle.fail_next_updates(1);
        let planes = PlaneBuffers::new(&FrameGeometry::new(4, 2).expect("geometry"));
        assert!(surface.update_planar_frame(planes.as_frame()).is_err());
        assert!(surface.update_planar_frame(planes.as_frame()).is_ok());
        assert_eq!(handle.failed_updates(), 1);
        assert_eq!(handle.updates(), 1);
    }

    #[test]
    fn test_quit_request() {
        let handle = MemorySurfaceHandle::new();
        let mut surface = handle.factory().create_surface(&request()).expect("surface");
        assert!(!surface.quit_requested());
        handle.request_quit();
        assert!(surface.quit_requested());
    }
}
