//! The scene facade driven by the host loop.
//!
//! [`Scene`] owns every piece of the choreography core: the particle
//! registry, the shared state, the engine, the mode controller and the
//! photo store. A host typically does three things per frame:
//!
//! ```ignore
//! // 1. Feed input (whichever path is active)
//! scene.handle_gesture_frame(video_time, tracker.landmarks());
//! scene.handle_input(&mut input);
//!
//! // 2. Advance
//! scene.update(clock.tick().dt);
//!
//! // 3. Render
//! scene.write_instances(&mut instances);
//! queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&instances));
//! ```

use std::path::Path;
use std::time::Duration;

use glam::{Mat4, Vec2};
use image::RgbaImage;

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::controller::{ModeController, ModeEvent};
use crate::engine::{ChoreographyEngine, FrameInput};
use crate::error::{PhotoError, SceneError};
use crate::focus::ViewerPose;
use crate::gesture::GesturePump;
use crate::input::Input;
use crate::instance::{self, FrameUniforms, InstanceRaw};
use crate::particle::{ParticleId, ParticleKind};
use crate::photos::{PhotoHandle, PhotoStore};
use crate::pointer::{self, PointerEvent};
use crate::registry::ParticleRegistry;
use crate::rig;
use crate::spawn::SpawnContext;
use crate::state::{Mode, SceneOptions, SharedState};

/// A complete, self-contained tree scene.
pub struct Scene {
    config: SceneConfig,
    registry: ParticleRegistry,
    state: SharedState,
    engine: ChoreographyEngine,
    controller: ModeController,
    photos: PhotoStore,
    spawner: SpawnContext,
    camera: Camera,
    pump: GesturePump,
    elapsed: f32,
    populated: bool,
}

impl Scene {
    /// Create an empty scene. Call [`populate`](Self::populate) to build the tree.
    pub fn new(config: SceneConfig) -> Self {
        // Placement and focus selection draw from separate streams so adding a
        // photo does not change which photo a pinch picks.
        let focus_seed = config.seed.map(|s| s.wrapping_add(1));
        let capacity = (config.tree.decoration_count + config.tree.dust_count) as usize;

        Self {
            registry: ParticleRegistry::with_capacity(capacity),
            state: SharedState::new(config.options),
            engine: ChoreographyEngine::new(config.choreography),
            controller: ModeController::new(
                config.gestures,
                Duration::from_millis(config.double_tap_window_ms),
                focus_seed,
            ),
            photos: PhotoStore::new(),
            spawner: SpawnContext::new(config.tree, config.seed),
            camera: Camera::new(),
            pump: GesturePump::new(),
            elapsed: 0.0,
            populated: false,
            config,
        }
    }

    /// Create the decorations and dust. Only the first call has any effect.
    ///
    /// Returns the number of particles created.
    pub fn populate(&mut self) -> usize {
        if self.populated {
            log::warn!("Scene already populated, ignoring");
            return 0;
        }
        self.populated = true;

        let tree = self.config.tree;
        for _ in 0..tree.decoration_count {
            let kind = self.spawner.decoration_kind();
            let layout = self.spawner.layout(kind);
            self.registry.insert(kind, layout, None);
        }
        for _ in 0..tree.dust_count {
            let layout = self.spawner.layout(ParticleKind::Dust);
            self.registry.insert(ParticleKind::Dust, layout, None);
        }

        let created = (tree.decoration_count + tree.dust_count) as usize;
        log::info!(
            "Populated tree: {} decorations, {} dust",
            tree.decoration_count,
            tree.dust_count
        );
        created
    }

    /// Advance the scene by `dt` seconds: ease the rig, then every particle.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;

        rig::update_rig(&mut self.state, &self.config.rig, self.elapsed, dt);

        let input = FrameInput::new(dt, self.elapsed, self.camera.pose(), self.rig_matrix());
        self.engine.tick(&input, &self.state, &mut self.registry);
    }

    /// Apply one hand-tracker result directly.
    ///
    /// `None` means no hand was found in the frame.
    pub fn handle_gesture(&mut self, landmarks: Option<&[Vec2]>) -> Option<ModeEvent> {
        self.controller
            .handle_gesture(&mut self.state, &self.registry, landmarks)
    }

    /// Apply a hand-tracker result for the video frame at `frame_time`.
    ///
    /// Frames already seen are dropped, so the host can call this every
    /// render frame even when the camera delivers fewer frames.
    pub fn handle_gesture_frame(&mut self, frame_time: f64, landmarks: Option<&[Vec2]>) -> Option<ModeEvent> {
        if !self.state.options.gestures_enabled || !self.pump.try_begin(frame_time) {
            return None;
        }
        let event = self.handle_gesture(landmarks);
        self.pump.finish();
        event
    }

    /// Apply one pointer event.
    ///
    /// Taps without a hit are resolved against the current photos by casting
    /// a ray from the camera through the tap position.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<ModeEvent> {
        let event = match event {
            PointerEvent::Tap { ndc, hit: None, at } => PointerEvent::Tap {
                ndc,
                hit: self.pick(ndc),
                at,
            },
            other => other,
        };
        self.controller
            .handle_pointer(&mut self.state, &self.registry, event)
    }

    /// Drain and apply every pointer event queued on `input`.
    ///
    /// Returns the last tap classification, if any.
    pub fn handle_input(&mut self, input: &mut Input) -> Option<ModeEvent> {
        let (width, height) = input.window_size();
        self.camera.set_viewport(width, height);
        input
            .drain()
            .into_iter()
            .filter_map(|event| self.handle_pointer(event))
            .last()
    }

    /// The photo under `ndc`, if any.
    pub fn pick(&self, ndc: Vec2) -> Option<ParticleId> {
        let ray = self.camera.ray_from_ndc(ndc);
        pointer::pick_photo(&self.registry, &self.rig_matrix(), &ray)
    }

    /// Report that hand tracking failed to start or stopped working.
    ///
    /// Switches to the pointer path. The current mode is kept.
    pub fn gesture_unavailable(&mut self, reason: &str) {
        log::warn!("Hand tracking unavailable ({}), falling back to pointer input", reason);
        self.set_gestures_enabled(false);
    }

    /// Choose between the gesture path and the pointer path.
    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        if self.state.options.gestures_enabled != enabled {
            log::info!("Gesture input {}", if enabled { "enabled" } else { "disabled" });
        }
        self.state.options.gestures_enabled = enabled;
        self.pump.reset();
    }

    /// Force a mode, e.g. from a keyboard shortcut.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        self.state.set_mode(mode)
    }

    pub fn set_options(&mut self, options: SceneOptions) {
        self.set_gestures_enabled(options.gestures_enabled);
        self.state.options = options;
    }

    /// Decode an image and add it to the tree as a PHOTO particle.
    pub fn add_photo(&mut self, bytes: &[u8]) -> Result<ParticleId, SceneError> {
        let handle = self.photos.upload(bytes)?;
        self.add_photo_handle(handle)
    }

    /// Read and decode an image file, then add it as a PHOTO particle.
    pub fn add_photo_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParticleId, SceneError> {
        let handle = self.photos.upload_file(path)?;
        self.add_photo_handle(handle)
    }

    /// Add an already decoded image as a PHOTO particle.
    pub fn add_photo_image(&mut self, image: RgbaImage) -> Result<ParticleId, SceneError> {
        let handle = self.photos.insert(image)?;
        self.add_photo_handle(handle)
    }

    /// Add a PHOTO particle for a photo already in the store.
    ///
    /// Each stored photo backs at most one particle.
    pub fn add_photo_handle(&mut self, handle: PhotoHandle) -> Result<ParticleId, SceneError> {
        if self.photos.get(handle).is_none() {
            return Err(PhotoError::UnknownHandle(handle).into());
        }
        if let Some(owner) = self.registry.iter().find(|r| r.payload() == Some(handle)) {
            return Err(PhotoError::AlreadyAttached {
                handle,
                owner: owner.id(),
            }
            .into());
        }

        let layout = self.spawner.layout(ParticleKind::Photo);
        let id = self.registry.insert(ParticleKind::Photo, layout, Some(handle));
        log::info!("Added photo {} ({} total)", id, self.registry.count_of(ParticleKind::Photo));
        Ok(id)
    }

    /// Remove a PHOTO particle and release its pixels.
    ///
    /// If it was the focus target the scene falls back to ASSEMBLED.
    pub fn remove_photo(&mut self, id: ParticleId) -> Result<(), SceneError> {
        let record = self.registry.get(id).ok_or(SceneError::UnknownParticle(id))?;
        if !record.is_photo() {
            return Err(SceneError::NotRemovable { id, kind: record.kind() });
        }

        let record = self.registry.remove(id).ok_or(SceneError::UnknownParticle(id))?;
        if let Some(handle) = record.payload() {
            if let Err(err) = self.photos.release(handle) {
                log::warn!("Photo {} had no stored pixels: {}", id, err);
            }
        }

        if self.state.release(id) {
            log::info!("Removed focused photo {}, returning to tree", id);
        } else {
            log::info!("Removed photo {}", id);
        }
        Ok(())
    }

    /// Refill `out` with GPU instances for every visible particle.
    pub fn write_instances(&self, out: &mut Vec<InstanceRaw>) {
        instance::write_instances(&self.registry, &self.rig_matrix(), out);
    }

    /// Camera uniforms for the frame just updated.
    pub fn uniforms(&self, dt: f32) -> FrameUniforms {
        FrameUniforms::new(self.camera.view_proj(), self.elapsed, dt)
    }

    #[inline]
    pub fn viewer_pose(&self) -> ViewerPose {
        self.camera.pose()
    }

    /// World transform of the rig that parents every particle.
    #[inline]
    pub fn rig_matrix(&self) -> Mat4 {
        rig::rig_matrix(self.state.rotation)
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    #[inline]
    pub fn focus_target(&self) -> Option<ParticleId> {
        self.state.focus_target()
    }

    #[inline]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[inline]
    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    #[inline]
    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    #[inline]
    pub fn engine(&self) -> &ChoreographyEngine {
        &self.engine
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Seconds of scene time accumulated by [`update`](Self::update).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}
