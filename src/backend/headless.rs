//! Recording backend for tests and headless environments.
//!
//! Implements [`RenderBackend`] without touching any display: every command
//! is appended to a shared log that tests inspect through a [`HeadlessProbe`]
//! cloned off the backend before it is handed to the engine.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;

use crate::backend::traits::{BackendError, BackendResult, RenderBackend, TextureHandle};
use crate::backend::types::*;

/// Stand-in for a native window handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessWindow;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ApplyOptions(RenderOptions),
    ClearFrame,
    LoadIdentity,
    Translate(Vec3),
    Rotate { angle_deg: f32, axis: Vec3 },
    Scale(Vec3),
    LineWidth(f32),
    BindTexture(TextureHandle),
    UnbindTexture,
    DrawArrays {
        mode: DrawMode,
        vertex_count: usize,
        has_colors: bool,
        has_texcoords: bool,
    },
    DrawElements {
        mode: DrawMode,
        vertex_count: usize,
        index_count: usize,
    },
    Swap,
    Destroy,
}

#[derive(Default)]
struct Recording {
    commands: Mutex<Vec<Command>>,
    frames_presented: AtomicUsize,
    textures_alive: AtomicUsize,
    destroyed: AtomicBool,
}

/// Read-side view of a [`HeadlessBackend`]'s recording.
#[derive(Clone)]
pub struct HeadlessProbe {
    recording: Arc<Recording>,
}

impl HeadlessProbe {
    /// Snapshot of all commands recorded so far.
    pub fn commands(&self) -> Vec<Command> {
        self.recording.commands.lock().clone()
    }

    /// Number of completed `swap_buffers` calls.
    pub fn frames_presented(&self) -> usize {
        self.recording.frames_presented.load(Ordering::Acquire)
    }

    /// Textures uploaded and not yet destroyed.
    pub fn textures_alive(&self) -> usize {
        self.recording.textures_alive.load(Ordering::Acquire)
    }

    /// Whether `destroy` has been called.
    pub fn destroyed(&self) -> bool {
        self.recording.destroyed.load(Ordering::Acquire)
    }

    /// Drop all recorded commands, keeping counters.
    pub fn clear_commands(&self) {
        self.recording.commands.lock().clear();
    }
}

/// In-memory [`RenderBackend`] implementation.
pub struct HeadlessBackend {
    configs: Vec<FramebufferConfig>,
    surface_size: (u32, u32),
    display_initialized: bool,
    next_texture: AtomicU64,
    recording: Arc<Recording>,
}

impl HeadlessBackend {
    /// Backend advertising a single RGB565/16-depth configuration on a
    /// 640x480 surface.
    pub fn new() -> Self {
        Self::with_configs(vec![FramebufferConfig {
            red: 5,
            green: 6,
            blue: 5,
            alpha: 0,
            depth: 16,
            stencil: 0,
        }])
    }

    /// Backend advertising exactly `configs`; an empty list makes context
    /// initialization fail the way a display without window configs would.
    pub fn with_configs(configs: Vec<FramebufferConfig>) -> Self {
        Self {
            configs,
            surface_size: (640, 480),
            display_initialized: false,
            next_texture: AtomicU64::new(1),
            recording: Arc::new(Recording::default()),
        }
    }

    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.surface_size = (width, height);
        self
    }

    /// Observer handle, valid after the backend has been moved into the
    /// engine.
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            recording: Arc::clone(&self.recording),
        }
    }

    fn record(&self, command: Command) {
        self.recording.commands.lock().push(command);
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    type Window = HeadlessWindow;

    fn init_display(&mut self) -> BackendResult<()> {
        self.display_initialized = true;
        Ok(())
    }

    fn enumerate_configs(&mut self) -> BackendResult<Vec<FramebufferConfig>> {
        if !self.display_initialized {
            return Err(BackendError::DisplayInitFailed(
                "display not initialized".into(),
            ));
        }
        Ok(self.configs.clone())
    }

    fn create_context(
        &mut self,
        _window: &Self::Window,
        _config: &FramebufferConfig,
    ) -> BackendResult<SurfaceInfo> {
        let (width, height) = self.surface_size;
        Ok(SurfaceInfo {
            width,
            height,
            format: 0,
        })
    }

    fn set_buffers_geometry(&mut self, _window: &Self::Window, _format: u32) {}

    fn apply_options(&mut self, options: &RenderOptions) {
        self.record(Command::ApplyOptions(*options));
    }

    fn destroy(&mut self) {
        self.display_initialized = false;
        self.record(Command::Destroy);
        self.recording.destroyed.store(true, Ordering::Release);
    }

    fn create_texture(&mut self, _data: &TextureData) -> BackendResult<TextureHandle> {
        let handle = TextureHandle(self.next_texture.fetch_add(1, Ordering::Relaxed));
        self.recording.textures_alive.fetch_add(1, Ordering::AcqRel);
        Ok(handle)
    }

    fn destroy_texture(&mut self, _texture: TextureHandle) {
        self.recording.textures_alive.fetch_sub(1, Ordering::AcqRel);
    }

    fn clear_frame(&mut self) {
        self.record(Command::ClearFrame);
    }

    fn load_identity(&mut self) {
        self.record(Command::LoadIdentity);
    }

    fn translate(&mut self, offset: Vec3) {
        self.record(Command::Translate(offset));
    }

    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        self.record(Command::Rotate { angle_deg, axis });
    }

    fn scale(&mut self, factors: Vec3) {
        self.record(Command::Scale(factors));
    }

    fn line_width(&mut self, width: f32) {
        self.record(Command::LineWidth(width));
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.record(Command::BindTexture(texture));
    }

    fn unbind_texture(&mut self) {
        self.record(Command::UnbindTexture);
    }

    fn draw_arrays(&mut self, mode: DrawMode, stream: &VertexStream<'_>) {
        self.record(Command::DrawArrays {
            mode,
            vertex_count: stream.vertex_count(),
            has_colors: stream.colors.is_some(),
            has_texcoords: stream.texcoords.is_some(),
        });
    }

    fn draw_elements(&mut self, mode: DrawMode, stream: &VertexStream<'_>, indices: &[u16]) {
        self.record(Command::DrawElements {
            mode,
            vertex_count: stream.vertex_count(),
            index_count: indices.len(),
        });
    }

    fn swap_buffers(&mut self) -> BackendResult<()> {
        self.record(Command::Swap);
        self.recording
            .frames_presented
            .fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
