//! Scene Viewer - an interactive 3D scene viewer backend
//!
//! One dedicated render worker owns the display/surface/context and all
//! render state; host threads post gestures, configuration changes and scene
//! uploads into coalescing single-slot mailboxes and never block on the
//! worker.
//!
//! # Features
//! - Mailbox-driven active-object render loop (latest-wins event coalescing)
//! - Geometry upload pipeline with index flattening for large meshes and a
//!   compact 16-bit index path for small ones
//! - Texture registry with name-based material resolution
//! - Tightest-match framebuffer configuration selection
//! - Pluggable rendering backend, including a recording headless backend for
//!   tests and CI

pub mod backend;
pub mod channel;
pub mod engine;
pub mod events;
pub mod import;
pub mod resources;
pub mod scene;

pub use backend::{ConfigRequirements, HeadlessBackend, LightMode, RenderBackend};
pub use engine::{EngineListener, NullListener, ViewerEngine};
pub use events::{DrawType, Rotation, Translation, Zoom};
pub use import::{MaterialData, MeshData, SceneData, TextureKind, TextureLoader};
pub use resources::{SUPREMUM_VERTICES, Z_SHIFT};

/// Outcome of the most recent surface or scene operation, exposed to the
/// host alongside the asynchronous string notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerStatus {
    #[default]
    Ok,
    /// Context initialization failed; a fresh surface event is required.
    WindowNotSet,
    /// The uploaded scene contained no meshes.
    NoMeshes,
    /// The uploaded scene exceeded the configured vertex ceiling.
    SceneTooLarge,
}

/// Configuration for constructing a [`ViewerEngine`].
#[derive(Debug, Clone, Copy)]
pub struct ViewerConfig {
    /// Ceiling on the total vertex count of an uploaded scene.
    pub vertex_limit: u32,
    /// Minimum framebuffer channel depths for context creation.
    pub framebuffer: ConfigRequirements,
    /// Rasterized diameter of point-cloud vertices.
    pub point_size: f32,
    /// Fixed-function light preset applied at context init.
    pub light_mode: LightMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            vertex_limit: SUPREMUM_VERTICES,
            framebuffer: ConfigRequirements::default(),
            point_size: 2.5,
            light_mode: LightMode::default(),
        }
    }
}
