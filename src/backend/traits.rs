//! Rendering backend abstraction.
//!
//! The render worker drives a fixed-function pipeline through this trait.
//! The trait owner is always the worker thread: no method is ever invoked
//! from more than one thread, which is what lets a real display/surface
//! implementation keep its context current without internal locking.

use glam::Vec3;
use thiserror::Error;

use crate::backend::types::*;

/// Backend error type.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize display: {0}")]
    DisplayInitFailed(String),
    #[error("No framebuffer configuration satisfies the requested minimums")]
    NoMatchingConfig,
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create context: {0}")]
    ContextCreationFailed(String),
    #[error("Failed to query surface: {0}")]
    SurfaceQueryFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to present: {0}")]
    PresentFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Fixed-function rendering backend owned by the render worker.
pub trait RenderBackend {
    /// Native window handle type accepted by this backend. Posted across
    /// threads with the surface event, so it must be `Send`.
    type Window: Send + 'static;

    // Display and context lifecycle

    /// Connect to the default display.
    fn init_display(&mut self) -> BackendResult<()>;

    /// All window-surface-capable framebuffer configurations of the display.
    fn enumerate_configs(&mut self) -> BackendResult<Vec<FramebufferConfig>>;

    /// Create the window surface and context for the chosen configuration
    /// and make them current.
    fn create_context(
        &mut self,
        window: &Self::Window,
        config: &FramebufferConfig,
    ) -> BackendResult<SurfaceInfo>;

    /// Adapt the native window buffers to the surface pixel format.
    fn set_buffers_geometry(&mut self, window: &Self::Window, format: u32);

    /// Apply one-time pipeline options (viewport, projection, depth test,
    /// culling, lighting).
    fn apply_options(&mut self, options: &RenderOptions);

    /// Tear down the context, surface and display. Idempotent.
    fn destroy(&mut self);

    // Texture upload

    fn create_texture(&mut self, data: &TextureData) -> BackendResult<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    // Per-frame commands

    fn clear_frame(&mut self);

    fn load_identity(&mut self);

    fn translate(&mut self, offset: Vec3);

    /// Rotate by `angle_deg` degrees around `axis`.
    fn rotate(&mut self, angle_deg: f32, axis: Vec3);

    fn scale(&mut self, factors: Vec3);

    fn line_width(&mut self, width: f32);

    fn bind_texture(&mut self, texture: TextureHandle);

    fn unbind_texture(&mut self);

    /// Sequential (non-indexed) draw over the whole stream.
    fn draw_arrays(&mut self, mode: DrawMode, stream: &VertexStream<'_>);

    /// Indexed draw with a 16-bit index buffer.
    fn draw_elements(&mut self, mode: DrawMode, stream: &VertexStream<'_>, indices: &[u16]);

    /// Present the frame. Swap interval zero: never blocks on vsync.
    fn swap_buffers(&mut self) -> BackendResult<()>;
}
