//! Process-wide scene state shared by the controller and the engine.
//!
//! There is exactly one [`SharedState`] per scene. The host loop owns it,
//! the [`ModeController`](crate::ModeController) mutates it in response to
//! input, and the [`ChoreographyEngine`](crate::ChoreographyEngine) reads it
//! every frame.

use serde::{Deserialize, Serialize};

use crate::particle::ParticleId;

/// Discrete display state of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Particles sit on the tree.
    #[default]
    Assembled,
    /// Particles float on a sphere shell around the tree.
    Dispersed,
    /// One photo is enlarged in front of the viewer; the rest disperse.
    Focused,
}

impl Mode {
    /// The other layout mode. FOCUSED toggles back to ASSEMBLED.
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Assembled => Mode::Dispersed,
            Mode::Dispersed | Mode::Focused => Mode::Assembled,
        }
    }
}

/// Most recent normalized directional input from the hand or pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSignal {
    /// `false` when no hand/pointer is currently steering.
    pub detected: bool,
    /// Horizontal position in `[-1, 1]`.
    pub x: f32,
    /// Vertical position in `[-1, 1]`.
    pub y: f32,
}

impl InputSignal {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            detected: true,
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    pub fn lost(self) -> Self {
        Self {
            detected: false,
            ..self
        }
    }
}

/// User-facing toggles from the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    /// Spin the tree slowly while assembled.
    pub auto_rotate: bool,
    /// Drive the mode machine from hand gestures instead of the pointer.
    pub gestures_enabled: bool,
    /// Show the ambient dust particles.
    pub ambient_visible: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            gestures_enabled: false,
            ambient_visible: true,
        }
    }
}

/// Smoothed euler rotation of the scene rig, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupRotation {
    pub x: f32,
    pub y: f32,
}

/// Mode, focus target, input and options of a running scene.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    mode: Mode,
    focus_target: Option<ParticleId>,
    pub input: InputSignal,
    pub options: SceneOptions,
    pub rotation: GroupRotation,
}

impl SharedState {
    pub fn new(options: SceneOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The focused particle. Always `None` outside FOCUSED.
    #[inline]
    pub fn focus_target(&self) -> Option<ParticleId> {
        self.focus_target
    }

    /// Switch modes. Any mode other than FOCUSED clears the focus target.
    ///
    /// Returns `true` if the mode changed.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        let changed = self.mode != mode;
        if changed {
            log::debug!("mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        if mode != Mode::Focused {
            self.focus_target = None;
        }
        changed
    }

    /// Enter FOCUSED with the given target, which may be `None` when there
    /// is nothing to focus on.
    pub fn focus(&mut self, target: Option<ParticleId>) {
        self.set_mode(Mode::Focused);
        self.focus_target = target;
    }

    /// Whether `id` is the current focus target.
    #[inline]
    pub fn is_focus_target(&self, id: ParticleId) -> bool {
        self.focus_target == Some(id)
    }

    /// Drop `id` from the focus slot, falling back to ASSEMBLED if it was
    /// the focus target. Returns `true` if a fallback happened.
    pub fn release(&mut self, id: ParticleId) -> bool {
        if self.is_focus_target(id) {
            self.set_mode(Mode::Assembled);
            true
        } else {
            false
        }
    }
}
