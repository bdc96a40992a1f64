//! # Noel - tree-scene particle choreography
//!
//! A render-agnostic core for an interactive 3D tree made of a few thousand
//! particles (leaves, gifts, ornaments, dust and user photos). The scene has
//! three moods and every particle knows where it belongs in each one:
//!
//! | Mode | Decorations | Dust | Photos |
//! |------|-------------|------|--------|
//! | ASSEMBLED | on the tree cone, spinning | collapsed | on the tree |
//! | DISPERSED | scattered shell, spinning | pulsing | scattered, enlarged |
//! | FOCUSED | scattered, slightly shrunk | pulsing | the target flies in front of the viewer |
//!
//! Hand gestures (pinch, fist, open hand) or pointer taps switch modes; the
//! engine eases every live transform toward its target each frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use noel::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::new().with_seed(42));
//! scene.populate();
//! scene.add_photo(&std::fs::read("holiday.jpg")?)?;
//!
//! let mut clock = FrameClock::new();
//! let mut instances = Vec::new();
//! loop {
//!     scene.handle_gesture(tracker.landmarks());
//!     scene.update(clock.tick().dt);
//!     scene.write_instances(&mut instances);
//!     // upload `instances` and draw
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`ParticleRecord`] carries an immutable layout (tree home, scatter home,
//! spin, base scale, pulse phase) and a live [`Transform`]. Records are owned
//! by the [`ParticleRegistry`] and addressed by [`ParticleId`].
//!
//! ### Modes
//!
//! [`SharedState`] holds the current [`Mode`] and the focus target. Leaving
//! FOCUSED always clears the target. The [`ModeController`] turns gesture
//! frames and [`PointerEvent`]s into mode changes.
//!
//! ### Choreography
//!
//! The [`ChoreographyEngine`] resolves each particle's position, rotation
//! and scale targets from an explicit (mode, role) policy table and eases
//! toward them with `1 - e^(-rate * dt)`. The focus target is placed in
//! front of the viewer by the [`FocusProjector`].

pub mod camera;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod focus;
pub mod gesture;
pub mod input;
pub mod instance;
pub mod particle;
pub mod photos;
pub mod pointer;
pub mod policy;
pub mod registry;
pub mod rig;
mod scene;
pub mod spawn;
pub mod state;
pub mod time;

pub use bytemuck;
pub use camera::Camera;
pub use config::{ChoreographyParams, GestureThresholds, RigParams, SceneConfig, TreeLayout};
pub use controller::{ModeController, ModeEvent};
pub use engine::{ChoreographyEngine, FrameInput};
pub use error::{PhotoError, SceneError};
pub use focus::{FocusProjector, ViewerPose};
pub use gesture::{GesturePump, GestureReading, HandLandmarks};
pub use glam::{Mat4, Vec2, Vec3};
pub use input::Input;
pub use instance::{FrameUniforms, InstanceRaw};
pub use particle::{ParticleId, ParticleKind, ParticleLayout, ParticleRecord, Transform};
pub use photos::{PhotoHandle, PhotoStore};
pub use pointer::{PointerEvent, TapDetector, TapKind};
pub use registry::ParticleRegistry;
pub use scene::Scene;
pub use spawn::SpawnContext;
pub use state::{GroupRotation, InputSignal, Mode, SceneOptions, SharedState};
pub use time::{FrameClock, FrameTime};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use noel::prelude::*;
/// ```
///
/// This imports:
/// - [`Scene`] and [`SceneConfig`] - the facade and its builder
/// - [`Mode`], [`ModeEvent`] - the state machine
/// - [`Input`], [`PointerEvent`] - the pointer path
/// - [`FrameClock`] - frame timing
/// - [`Vec2`], [`Vec3`], [`Mat4`] - glam math types
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::config::SceneConfig;
    pub use crate::controller::ModeEvent;
    pub use crate::error::{PhotoError, SceneError};
    pub use crate::input::Input;
    pub use crate::instance::{FrameUniforms, InstanceRaw};
    pub use crate::particle::{ParticleId, ParticleKind};
    pub use crate::pointer::PointerEvent;
    pub use crate::scene::Scene;
    pub use crate::state::{Mode, SceneOptions};
    pub use crate::time::FrameClock;
    pub use crate::{Mat4, Vec2, Vec3};
}
