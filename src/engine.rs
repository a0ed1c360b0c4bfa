//! The active rendering object: one worker thread owning the context.
//!
//! Any number of host threads post typed events into per-event-kind
//! mailboxes; the worker drains all pending mailboxes in a fixed priority
//! order, applies each mutation to its privately owned state, then renders
//! one frame. No lock guards the render state itself: it is only ever
//! touched by the worker after the relevant mailbox has been drained, which
//! is the whole point of the per-channel design.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use glam::Vec3;
use parking_lot::RwLock;

use crate::backend::chooser::ConfigRequirements;
use crate::backend::traits::{BackendError, BackendResult, RenderBackend};
use crate::backend::types::{DrawMode, Frustum, LightMode, RenderOptions, SurfaceInfo, VertexStream};
use crate::channel::{Mailbox, Waker};
use crate::events::{DrawType, Rotation, Translation, Zoom};
use crate::import::SceneData;
use crate::resources::{
    validate_scene, IndexKind, LoadedTexture, MeshBuffers, SceneError, TextureRegistry,
};
use crate::scene::{parse_hex_color, Decorations, ViewTransform, AXIS_LINE_WIDTH};
use crate::{ViewerConfig, ViewerStatus};

/// Host-notification collaborator, injected at construction.
///
/// Both callbacks fire on the render worker thread; implementations must not
/// block for long.
pub trait EngineListener: Send {
    /// Human-readable progress/failure message for the host UI.
    fn on_string_event(&self, message: &str);

    /// Fired exactly once, after the context and every owned resource have
    /// been torn down.
    fn on_context_destroyed(&self, destroyed: bool);
}

/// Listener that discards every notification.
pub struct NullListener;

impl EngineListener for NullListener {
    fn on_string_event(&self, _message: &str) {}
    fn on_context_destroyed(&self, _destroyed: bool) {}
}

/// One mailbox per event kind. The declaration order here mirrors the drain
/// priority order of the worker cycle.
struct Mailboxes<B: RenderBackend> {
    surface: Mailbox<B::Window>,
    translation: Mailbox<Translation>,
    rotation: Mailbox<Rotation>,
    zoom: Mailbox<Zoom>,
    drop_all: Mailbox<()>,
    drop_translation: Mailbox<()>,
    drop_rotation: Mailbox<()>,
    drop_zoom: Mailbox<()>,
    clear_surface: Mailbox<()>,
    textures_enabled: Mailbox<bool>,
    vertex_limit: Mailbox<u32>,
    draw_type: Mailbox<DrawType>,
    background_color: Mailbox<String>,
    axis_visibility: Mailbox<bool>,
    scene: Mailbox<SceneData>,
}

impl<B: RenderBackend> Default for Mailboxes<B> {
    fn default() -> Self {
        Self {
            surface: Mailbox::default(),
            translation: Mailbox::default(),
            rotation: Mailbox::default(),
            zoom: Mailbox::default(),
            drop_all: Mailbox::default(),
            drop_translation: Mailbox::default(),
            drop_rotation: Mailbox::default(),
            drop_zoom: Mailbox::default(),
            clear_surface: Mailbox::default(),
            textures_enabled: Mailbox::default(),
            vertex_limit: Mailbox::default(),
            draw_type: Mailbox::default(),
            background_color: Mailbox::default(),
            axis_visibility: Mailbox::default(),
            scene: Mailbox::default(),
        }
    }
}

impl<B: RenderBackend> Mailboxes<B> {
    fn any_state_event_pending(&self) -> bool {
        self.translation.is_pending()
            || self.rotation.is_pending()
            || self.zoom.is_pending()
            || self.drop_all.is_pending()
            || self.drop_translation.is_pending()
            || self.drop_rotation.is_pending()
            || self.drop_zoom.is_pending()
            || self.clear_surface.is_pending()
            || self.textures_enabled.is_pending()
            || self.vertex_limit.is_pending()
            || self.draw_type.is_pending()
            || self.background_color.is_pending()
            || self.axis_visibility.is_pending()
            || self.scene.is_pending()
    }

    /// Whether the worker has anything it can act on right now. Events other
    /// than the surface one stay parked until a context exists, so they must
    /// not wake the worker before then.
    fn any_ready(&self, context_initialized: bool) -> bool {
        self.surface.is_pending() || (context_initialized && self.any_state_event_pending())
    }
}

/// Transform values republished for the host-side getters after each cycle.
#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    transform: ViewTransform,
    rotation_axes: [bool; 3],
}

struct SharedState<B: RenderBackend> {
    mail: Mailboxes<B>,
    waker: Waker,
    shutdown: AtomicBool,
    context_initialized: AtomicBool,
    data_loaded: AtomicBool,
    status: RwLock<ViewerStatus>,
    snapshot: RwLock<Snapshot>,
}

/// Handle to the render worker. Cheap to share by reference across host
/// threads; every setter posts into a mailbox and returns immediately.
pub struct ViewerEngine<B: RenderBackend> {
    shared: Arc<SharedState<B>>,
    worker: Option<JoinHandle<()>>,
}

impl<B: RenderBackend + Send + 'static> ViewerEngine<B> {
    /// Start the render worker. The engine is idle (and renders nothing)
    /// until a window surface is posted via [`set_window`](Self::set_window).
    pub fn new(backend: B, config: ViewerConfig, listener: Box<dyn EngineListener>) -> Self {
        let shared = Arc::new(SharedState {
            mail: Mailboxes::default(),
            waker: Waker::default(),
            shutdown: AtomicBool::new(false),
            context_initialized: AtomicBool::new(false),
            data_loaded: AtomicBool::new(false),
            status: RwLock::new(ViewerStatus::Ok),
            snapshot: RwLock::new(Snapshot::default()),
        });

        let worker = Worker {
            shared: Arc::clone(&shared),
            backend,
            listener,
            requirements: config.framebuffer,
            vertex_limit: config.vertex_limit,
            point_size: config.point_size,
            light_mode: config.light_mode,
            surface: None,
            transform: ViewTransform::default(),
            rotation_axes: [false; 3],
            decor: Decorations::default(),
            draw_mode: DrawMode::Triangles,
            background: None,
            axis_visible: false,
            textures_enabled: true,
            meshes: Vec::new(),
            registry: TextureRegistry::new(),
        };

        let handle = thread::Builder::new()
            .name("scene-viewer-render".into())
            .spawn(move || worker.run())
            .expect("failed to spawn render worker thread");

        Self {
            shared,
            worker: Some(handle),
        }
    }
}

impl<B: RenderBackend> ViewerEngine<B> {
    fn post<T>(&self, mailbox: &Mailbox<T>, value: T) {
        mailbox.post(value);
        self.shared.waker.notify();
    }

    // Event producers. Safe from any thread at any time; posting never
    // blocks on the worker, and posts after `stop` simply go undrained.

    /// Hand over the native window surface; triggers (re)initialization of
    /// the rendering context.
    pub fn set_window(&self, window: B::Window) {
        self.post(&self.shared.mail.surface, window);
    }

    /// Replace the scene vertex-count ceiling used to validate uploads.
    pub fn set_vertex_limit(&self, limit: u32) {
        self.post(&self.shared.mail.vertex_limit, limit);
    }

    pub fn set_draw_type(&self, draw_type: DrawType) {
        self.post(&self.shared.mail.draw_type, draw_type);
    }

    /// Background color as an 8-hex-digit ARGB string, optionally
    /// `#`-prefixed. An empty string restores the default gradient.
    pub fn set_background_color(&self, color: impl Into<String>) {
        self.post(&self.shared.mail.background_color, color.into());
    }

    pub fn set_axis_visibility(&self, visible: bool) {
        self.post(&self.shared.mail.axis_visibility, visible);
    }

    pub fn translate(&self, gesture: Translation) {
        self.post(&self.shared.mail.translation, gesture);
    }

    pub fn rotate(&self, gesture: Rotation) {
        self.post(&self.shared.mail.rotation, gesture);
    }

    pub fn zoom(&self, gesture: Zoom) {
        self.post(&self.shared.mail.zoom, gesture);
    }

    pub fn drop_all_gestures(&self) {
        self.post(&self.shared.mail.drop_all, ());
    }

    pub fn drop_translation(&self) {
        self.post(&self.shared.mail.drop_translation, ());
    }

    pub fn drop_rotation(&self) {
        self.post(&self.shared.mail.drop_rotation, ());
    }

    pub fn drop_zoom(&self) {
        self.post(&self.shared.mail.drop_zoom, ());
    }

    /// Discard the loaded scene and its textures.
    pub fn clear_surface(&self) {
        self.post(&self.shared.mail.clear_surface, ());
    }

    pub fn set_textures_enabled(&self, enabled: bool) {
        self.post(&self.shared.mail.textures_enabled, enabled);
    }

    /// Upload an imported scene. Validation and GPU upload happen on the
    /// worker; failures surface through [`status`](Self::status) and the
    /// listener.
    pub fn upload_scene(&self, scene: SceneData) {
        self.post(&self.shared.mail.scene, scene);
    }

    // Getters, served from the snapshot the worker republishes per cycle.

    pub fn translation(&self) -> Vec3 {
        self.shared.snapshot.read().transform.translation
    }

    /// Accumulated rotation angles in degrees.
    pub fn rotation(&self) -> Vec3 {
        self.shared.snapshot.read().transform.angles
    }

    /// Axis-enable flags of the most recent rotation gesture.
    pub fn rotation_axes(&self) -> (bool, bool, bool) {
        let axes = self.shared.snapshot.read().rotation_axes;
        (axes[0], axes[1], axes[2])
    }

    pub fn zoom_factors(&self) -> Vec3 {
        self.shared.snapshot.read().transform.scale
    }

    /// Outcome of the most recent surface/scene operation.
    pub fn status(&self) -> ViewerStatus {
        *self.shared.status.read()
    }

    pub fn is_context_initialized(&self) -> bool {
        self.shared.context_initialized.load(Ordering::Acquire)
    }

    pub fn is_scene_loaded(&self) -> bool {
        self.shared.data_loaded.load(Ordering::Acquire)
    }

    /// Stop the worker and release the context synchronously. The listener's
    /// context-destroyed notification has fired by the time this returns.
    pub fn stop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.shared.shutdown.store(true, Ordering::Release);
            self.shared.waker.notify();
            if handle.join().is_err() {
                log::error!("render worker terminated abnormally");
            }
        }
    }
}

impl<B: RenderBackend> Drop for ViewerEngine<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker-side state. Everything in here is owned by the render thread.
struct Worker<B: RenderBackend> {
    shared: Arc<SharedState<B>>,
    backend: B,
    listener: Box<dyn EngineListener>,
    requirements: ConfigRequirements,
    vertex_limit: u32,
    point_size: f32,
    light_mode: LightMode,
    surface: Option<SurfaceInfo>,
    transform: ViewTransform,
    rotation_axes: [bool; 3],
    decor: Decorations,
    draw_mode: DrawMode,
    /// Parsed host background color; `None` selects the default gradient.
    background: Option<[f32; 4]>,
    axis_visible: bool,
    textures_enabled: bool,
    meshes: Vec<MeshBuffers>,
    registry: TextureRegistry,
}

impl<B: RenderBackend> Worker<B> {
    fn run(mut self) {
        log::debug!("render worker started");
        loop {
            let shared = Arc::clone(&self.shared);
            shared.waker.wait_until(|| {
                shared.shutdown.load(Ordering::Acquire)
                    || shared
                        .mail
                        .any_ready(shared.context_initialized.load(Ordering::Acquire))
            });
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
            self.cycle();
            self.publish_snapshot();
        }
        self.teardown();
        log::debug!("render worker stopped");
    }

    /// One drain-and-render cycle.
    ///
    /// The drain order is fixed: scene replacement happens after transform
    /// and configuration updates so a just-uploaded scene is rendered with
    /// the current camera state. Most state events abort the cycle when no
    /// scene is loaded, which keeps an empty or half-configured scene from
    /// reaching the screen; the cosmetic events (clear, background, axes)
    /// and the upload itself render regardless.
    fn cycle(&mut self) {
        if let Some(window) = self.shared.mail.surface.take() {
            self.process_surface(window);
        }
        if !self.shared.context_initialized.load(Ordering::Acquire) {
            return;
        }

        if let Some(gesture) = self.shared.mail.translation.take() {
            self.transform.apply_translation(&gesture);
            if !self.data_loaded() {
                return;
            }
        }
        if let Some(gesture) = self.shared.mail.rotation.take() {
            self.transform.apply_rotation(&gesture);
            self.rotation_axes = [gesture.x_axis, gesture.y_axis, gesture.z_axis];
            if !self.data_loaded() {
                return;
            }
        }
        if let Some(gesture) = self.shared.mail.zoom.take() {
            self.transform.apply_zoom(&gesture);
            if !self.data_loaded() {
                return;
            }
        }
        if self.shared.mail.drop_all.take().is_some() {
            self.transform.drop_all();
            if !self.data_loaded() {
                return;
            }
        }
        if self.shared.mail.drop_translation.take().is_some() {
            self.transform.drop_translation();
            if !self.data_loaded() {
                return;
            }
        }
        if self.shared.mail.drop_rotation.take().is_some() {
            self.transform.drop_rotation();
            if !self.data_loaded() {
                return;
            }
        }
        if self.shared.mail.drop_zoom.take().is_some() {
            self.transform.drop_zoom();
            if !self.data_loaded() {
                return;
            }
        }
        if self.shared.mail.clear_surface.take().is_some() {
            self.clear_scene();
        }
        if let Some(enabled) = self.shared.mail.textures_enabled.take() {
            self.textures_enabled = enabled;
            if !self.data_loaded() {
                return;
            }
        }
        if let Some(limit) = self.shared.mail.vertex_limit.take() {
            self.vertex_limit = limit;
            if !self.data_loaded() {
                return;
            }
        }
        if let Some(draw_type) = self.shared.mail.draw_type.take() {
            self.draw_mode = match draw_type {
                DrawType::PointCloud => DrawMode::Points,
                DrawType::Wireframe => DrawMode::Lines,
                DrawType::Mesh => DrawMode::Triangles,
            };
            if !self.data_loaded() {
                return;
            }
        }
        if let Some(color) = self.shared.mail.background_color.take() {
            self.set_background(&color);
        }
        if let Some(visible) = self.shared.mail.axis_visibility.take() {
            self.axis_visible = visible;
        }
        if let Some(scene) = self.shared.mail.scene.take() {
            self.process_scene(scene);
        }

        self.render();
    }

    fn data_loaded(&self) -> bool {
        self.shared.data_loaded.load(Ordering::Acquire)
    }

    fn set_data_loaded(&self, loaded: bool) {
        self.shared.data_loaded.store(loaded, Ordering::Release);
    }

    fn set_status(&self, status: ViewerStatus) {
        *self.shared.status.write() = status;
    }

    fn publish_snapshot(&self) {
        *self.shared.snapshot.write() = Snapshot {
            transform: self.transform,
            rotation_axes: self.rotation_axes,
        };
    }

    // Surface lifecycle

    fn process_surface(&mut self, window: B::Window) {
        match self.init_context(&window) {
            Ok(info) => {
                log::info!(
                    "window surface initialized: {}x{} format {}",
                    info.width,
                    info.height,
                    info.format
                );
                self.surface = Some(info);
                self.shared
                    .context_initialized
                    .store(true, Ordering::Release);
                self.set_status(ViewerStatus::Ok);
                self.backend.set_buffers_geometry(&window, info.format);
                self.configure_pipeline();
            }
            Err(error) => {
                log::error!("context initialization failed: {error}");
                self.backend.destroy();
                self.surface = None;
                self.shared
                    .context_initialized
                    .store(false, Ordering::Release);
                self.set_status(ViewerStatus::WindowNotSet);
                self.listener.on_string_event("Failed to set window!");
            }
        }
    }

    fn init_context(&mut self, window: &B::Window) -> BackendResult<SurfaceInfo> {
        self.backend.init_display()?;
        let configs = self.backend.enumerate_configs()?;
        log::debug!("display reports {} framebuffer configurations", configs.len());
        let config = self
            .requirements
            .choose(&configs)
            .ok_or(BackendError::NoMatchingConfig)?;
        self.backend.create_context(window, &config)
    }

    fn configure_pipeline(&mut self) {
        let Some(info) = self.surface else {
            return;
        };
        let options = RenderOptions {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            // Outset the viewport to hide the surface border.
            viewport_x: -4,
            viewport_y: -4,
            viewport_width: info.width + 4,
            viewport_height: info.height + 4,
            frustum: Frustum::from_aspect(info.width, info.height),
            point_size: self.point_size,
            light_mode: self.light_mode,
        };
        self.backend.apply_options(&options);
        self.rebuild_background();
    }

    fn set_background(&mut self, color_text: &str) {
        if color_text.is_empty() {
            self.background = None;
        } else if let Some(color) = parse_hex_color(color_text) {
            self.background = Some(color);
        } else {
            log::warn!("ignoring malformed background color {color_text:?}");
            return;
        }
        self.rebuild_background();
    }

    fn rebuild_background(&mut self) {
        if let Some(info) = self.surface {
            self.decor
                .set_background(info.width, info.height, self.background);
        }
    }

    // Scene lifecycle

    fn clear_scene(&mut self) {
        self.set_status(ViewerStatus::Ok);
        for texture in self.registry.drain() {
            self.backend.destroy_texture(texture.handle);
        }
        self.set_data_loaded(false);
        self.meshes.clear();
    }

    fn process_scene(&mut self, scene: SceneData) {
        // The previous scene is gone either way; a failed upload leaves the
        // viewer empty, not showing stale geometry.
        self.clear_scene();

        log::debug!(
            "scene upload: meshes={} vertices={} polygons={}",
            scene.meshes.len(),
            scene.total_vertices(),
            scene.total_polygons()
        );
        if let Err(error) = validate_scene(&scene, self.vertex_limit) {
            self.set_status(match error {
                SceneError::NoMeshes => ViewerStatus::NoMeshes,
                SceneError::SceneTooLarge => ViewerStatus::SceneTooLarge,
            });
            self.listener.on_string_event(&error.to_string());
            return;
        }
        self.set_data_loaded(true);

        let SceneData {
            meshes,
            materials,
            mut textures,
        } = scene;

        self.registry.begin_scene(textures.len());
        for (slot, loader) in textures.iter_mut().enumerate() {
            let Some(data) = loader.load() else {
                log::warn!("texture {:?} failed to decode", loader.name());
                continue;
            };
            match self.backend.create_texture(&data) {
                Ok(handle) => {
                    self.registry.insert(
                        slot,
                        LoadedTexture::new(handle, data.width, data.height, data.format, loader.name()),
                    );
                }
                Err(error) => {
                    log::warn!("texture {:?} upload failed: {error}", loader.name());
                }
            }
        }
        log::debug!("textures loaded: {}/{}", self.registry.len(), textures.len());

        for mesh in &meshes {
            let mut buffers = MeshBuffers::build(mesh);
            buffers.texture_slot = self.registry.resolve_slot(materials.get(mesh.material_index));
            self.meshes.push(buffers);
        }
    }

    // Draw procedure

    fn render(&mut self) {
        if self.surface.is_none() {
            return;
        }
        self.backend.clear_frame();
        self.backend.load_identity();
        self.draw_background();

        let transform = self.transform;
        self.backend.translate(transform.translation);
        self.backend.rotate(transform.angles.y, transform.y_axis);
        self.backend.rotate(-transform.angles.x, transform.x_axis);
        self.backend.rotate(transform.angles.z, transform.z_axis);
        self.backend.scale(transform.scale);

        self.draw_axes();
        for index in 0..self.meshes.len() {
            self.draw_mesh(index);
        }

        if let Err(error) = self.backend.swap_buffers() {
            log::warn!("frame presentation failed: {error}");
        }
    }

    fn draw_background(&mut self) {
        let stream = VertexStream {
            positions: &self.decor.background_vertices,
            normals: None,
            colors: Some(&self.decor.background_colors),
            texcoords: None,
        };
        self.backend.draw_arrays(DrawMode::TriangleStrip, &stream);
    }

    fn draw_axes(&mut self) {
        if !self.axis_visible {
            return;
        }
        self.backend.line_width(AXIS_LINE_WIDTH);
        for axis in &self.decor.axes {
            let stream = VertexStream {
                positions: &axis.vertices,
                normals: None,
                colors: Some(&axis.colors),
                texcoords: None,
            };
            self.backend.draw_arrays(DrawMode::Lines, &stream);
        }
    }

    fn draw_mesh(&mut self, index: usize) {
        let mesh = &self.meshes[index];
        let texturing =
            self.textures_enabled && self.registry.has_textures() && !self.registry.is_empty();

        let mut texture_bound = false;
        if texturing {
            if let Some(slot) = mesh.texture_slot {
                if let Some(texture) = self.registry.get(slot) {
                    self.backend.bind_texture(texture.handle);
                    texture_bound = true;
                }
            }
        }

        let stream = VertexStream {
            positions: &mesh.vertices,
            normals: Some(&mesh.normals),
            colors: mesh.colors.as_deref(),
            texcoords: if texturing {
                mesh.texcoords.as_deref()
            } else {
                None
            },
        };
        match &mesh.indices {
            IndexKind::Rearranged => self.backend.draw_arrays(self.draw_mode, &stream),
            IndexKind::Short(indices) => {
                self.backend.draw_elements(self.draw_mode, &stream, indices)
            }
        }

        if texture_bound {
            self.backend.unbind_texture();
        }
    }

    // Teardown

    fn teardown(&mut self) {
        for texture in self.registry.drain() {
            self.backend.destroy_texture(texture.handle);
        }
        self.backend.destroy();
        self.shared
            .context_initialized
            .store(false, Ordering::Release);
        self.listener.on_context_destroyed(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessBackend;

    #[test]
    fn state_events_do_not_wake_an_uninitialized_worker() {
        let mail: Mailboxes<HeadlessBackend> = Mailboxes::default();
        mail.translation.post(Translation {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        });
        // Without a context only the surface event is actionable.
        assert!(!mail.any_ready(false));
        assert!(mail.any_ready(true));

        mail.surface.post(crate::backend::headless::HeadlessWindow);
        assert!(mail.any_ready(false));
    }
}
