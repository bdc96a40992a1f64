//! Pointer path: taps, double taps and photo hit-testing.
//!
//! Pointer input only drives the mode machine while hand gestures are
//! disabled. Timestamps are durations since scene start so tap timing can be
//! replayed deterministically.

use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};

use crate::particle::ParticleId;
use crate::registry::ParticleRegistry;
use crate::state::Mode;

/// Half the edge of a photo frame at scale 1.
const PHOTO_HALF_EXTENT: f32 = 0.7;

/// One event from the pointer/touch collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to a position in normalized device coordinates.
    Move { ndc: Vec2 },
    /// Pointer left the surface.
    Leave,
    /// Click or tap, with the PHOTO particle under it, if any.
    Tap {
        ndc: Vec2,
        hit: Option<ParticleId>,
        /// Real time since start; double taps are judged on this.
        at: Duration,
    },
}

/// Outcome of registering a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Single,
    /// Second tap of a pair. Carries the mode that was current before the
    /// first tap so the pair can override whatever the first tap did.
    Double { mode_before: Mode },
}

/// Detects double taps.
#[derive(Debug, Clone)]
pub struct TapDetector {
    window: Duration,
    pending: Option<(Duration, Mode)>,
}

impl TapDetector {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a tap at time `at`, with `mode` being the mode before this
    /// tap is applied.
    pub fn register(&mut self, at: Duration, mode: Mode) -> TapKind {
        match self.pending.take() {
            Some((first, mode_before)) if at >= first && at - first <= self.window => {
                TapKind::Double { mode_before }
            }
            _ => {
                self.pending = Some((at, mode));
                TapKind::Single
            }
        }
    }
}

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Distance along the ray to the nearest hit with a sphere, if any.
    pub fn hit_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        let far = -b + sqrt_d;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}

/// Nearest PHOTO particle under `ray`, testing each photo's bounding sphere
/// at its live transform inside the scene rig.
pub fn pick_photo(registry: &ParticleRegistry, rig: &Mat4, ray: &Ray) -> Option<ParticleId> {
    let rig_scale = Vec3::new(
        rig.x_axis.truncate().length(),
        rig.y_axis.truncate().length(),
        rig.z_axis.truncate().length(),
    )
    .max_element();
    registry
        .iter()
        .filter(|r| r.is_photo())
        .filter_map(|r| {
            let center = rig.transform_point3(r.live().position);
            let radius = PHOTO_HALF_EXTENT * std::f32::consts::SQRT_2 * r.live().scale * rig_scale;
            ray.hit_sphere(center, radius).map(|t| (t, r.id()))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}
