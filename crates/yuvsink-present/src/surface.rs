//! Presentation surface seam
//!
//! A surface is a window plus whatever renderer and streaming texture the
//! backend needs to show planar YUV frames. The sink never touches a surface
//! from the producer thread: a [`SurfaceFactory`] is moved onto the
//! presentation thread and builds the surface there, so backends whose
//! handles are tied to one thread work unchanged.

use yuvsink_frame::PlanarFrame;

use crate::error::SurfaceError;

/// What the presentation thread asks a factory for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    /// Window title
    pub title: String,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
    /// Texture width, the source frame width
    pub source_width: u32,
    /// Texture height, the source frame height
    pub source_height: u32,
}

/// A window that can show planar YUV frames
///
/// Releasing the surface is its `Drop`.
pub trait PresentationSurface {
    /// Upload one frame into the streaming texture
    fn update_planar_frame(&mut self, frame: PlanarFrame<'_>) -> Result<(), SurfaceError>;

    /// Show the most recently uploaded frame
    fn present(&mut self);

    /// Drain pending window events and report whether the user asked to quit
    fn quit_requested(&mut self) -> bool;
}

/// Builds a [`PresentationSurface`] on the presentation thread
///
/// Implemented for any `FnOnce(&SurfaceRequest) -> Result<S, SurfaceError>`
/// closure that can be sent across threads.
pub trait SurfaceFactory: Send + 'static {
    /// Surface type this factory builds
    type Surface: PresentationSurface;

    /// Acquire the window, renderer and texture
    fn create_surface(self, request: &SurfaceRequest) -> Result<Self::Surface, SurfaceError>;
}

impl<F, S> SurfaceFactory for F
where
    F: FnOnce(&SurfaceRequest) -> Result<S, SurfaceError> + Send + 'static,
    S: PresentationSurface,
{
    type Surface = S;

    fn create_surface(self, request: &SurfaceRequest) -> Result<S, SurfaceError> {
        self(request)
    }
}
