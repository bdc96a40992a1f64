//! Choreography table: what each particle does in each mode.
//!
//! The engine never branches on mode flags directly. It asks this module for
//! a [`Motion`] (where to go, how to rotate, how fast) and a [`ScalePolicy`]
//! (how big to be), both of which are total functions over small enums so
//! every combination can be enumerated in tests.
//!
//! | Mode | Role | Target | Rotation | Rate |
//! |------|------|--------|----------|------|
//! | Assembled | any | tree home | settle upright | normal |
//! | Dispersed | any | scatter home | spin | normal |
//! | Focused | focus target | focus point | face viewer | fast |
//! | Focused | other | scatter home | spin | normal |

use crate::config::ChoreographyParams;
use crate::particle::ParticleKind;
use crate::state::Mode;

/// A particle's relationship to the focus slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    FocusTarget,
    Other,
}

impl Role {
    pub fn of(is_focus_target: bool) -> Self {
        if is_focus_target {
            Role::FocusTarget
        } else {
            Role::Other
        }
    }
}

/// Where a particle heads this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    /// Tree layout home.
    Primary,
    /// Scatter layout home.
    Secondary,
    /// The projected point in front of the viewer.
    FocusPoint,
}

/// How a particle's rotation evolves this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Tumble freely at the particle's spin rate.
    Spin,
    /// Ease pitch and roll back to zero while turning slowly about Y.
    Settle,
    /// Settle, then turn to face the viewer.
    FaceViewer,
}

/// Target, rotation and easing speed for one (mode, role) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motion {
    pub target: TargetSelector,
    pub rotation: RotationPolicy,
    /// Use the fast position rate.
    pub fast: bool,
}

/// Look up the motion of a particle.
pub fn motion(mode: Mode, role: Role) -> Motion {
    match (mode, role) {
        (Mode::Assembled, _) => Motion {
            target: TargetSelector::Primary,
            rotation: RotationPolicy::Settle,
            fast: false,
        },
        (Mode::Dispersed, _) | (Mode::Focused, Role::Other) => Motion {
            target: TargetSelector::Secondary,
            rotation: RotationPolicy::Spin,
            fast: false,
        },
        (Mode::Focused, Role::FocusTarget) => Motion {
            target: TargetSelector::FocusPoint,
            rotation: RotationPolicy::FaceViewer,
            fast: true,
        },
    }
}

/// How a particle's target scale is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalePolicy {
    /// Shrink to nothing.
    Collapse,
    /// Breathe around the base scale with a per-particle phase.
    Pulse,
    /// Nominal size.
    Base,
    /// Base scale times a factor.
    Factor(f32),
    /// An absolute size independent of the base scale.
    Fixed(f32),
}

impl ScalePolicy {
    /// Target scale at wall-clock time `elapsed` seconds.
    pub fn resolve(self, base_scale: f32, phase: f32, elapsed: f32, pulse_frequency: f32) -> f32 {
        match self {
            ScalePolicy::Collapse => 0.0,
            ScalePolicy::Pulse => base_scale * (0.8 + 0.4 * (pulse_frequency * elapsed + phase).sin()),
            ScalePolicy::Base => base_scale,
            ScalePolicy::Factor(factor) => base_scale * factor,
            ScalePolicy::Fixed(scale) => scale,
        }
    }
}

/// Look up the scale policy of a particle.
pub fn scale_policy(
    mode: Mode,
    role: Role,
    kind: ParticleKind,
    ambient_visible: bool,
    params: &ChoreographyParams,
) -> ScalePolicy {
    if kind.is_ambient() {
        return if mode == Mode::Assembled || !ambient_visible {
            ScalePolicy::Collapse
        } else {
            ScalePolicy::Pulse
        };
    }

    match (mode, role, kind) {
        (Mode::Dispersed, _, ParticleKind::Photo) => ScalePolicy::Factor(params.dispersed_photo_factor),
        (Mode::Focused, Role::FocusTarget, _) => ScalePolicy::Fixed(params.focus_scale),
        (Mode::Focused, Role::Other, _) => ScalePolicy::Factor(params.focus_background_factor),
        _ => ScalePolicy::Base,
    }
}
