//! Particle records: immutable layout data plus a live transform.
//!
//! A [`ParticleRecord`] never references a drawable object. The renderer maps
//! records to its own handles through the stable [`ParticleId`], and reads
//! the [`Transform`] once per frame after the engine tick.

use std::fmt;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::photos::PhotoHandle;

/// Stable identifier of a particle within a [`ParticleRegistry`](crate::ParticleRegistry).
///
/// Ids are never reused, so a stale id held after removal simply fails to
/// resolve instead of aliasing a newer particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u32);

impl ParticleId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a particle depicts. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Green foliage box.
    Leaf,
    /// Gold gift box.
    Gift,
    /// Gold bauble.
    Ball,
    /// Red bauble.
    RedBall,
    /// Ambient snow/dust speck.
    Dust,
    /// User-uploaded photo frame.
    Photo,
}

impl ParticleKind {
    /// Number of kinds, for tables indexed by kind.
    pub const COUNT: usize = 6;

    /// Whether this kind fades in and out with the scene instead of persisting.
    #[inline]
    pub fn is_ambient(self) -> bool {
        matches!(self, ParticleKind::Dust)
    }
}

impl From<ParticleKind> for u32 {
    fn from(kind: ParticleKind) -> u32 {
        match kind {
            ParticleKind::Leaf => 0,
            ParticleKind::Gift => 1,
            ParticleKind::Ball => 2,
            ParticleKind::RedBall => 3,
            ParticleKind::Dust => 4,
            ParticleKind::Photo => 5,
        }
    }
}

/// Position, XYZ euler rotation and uniform scale of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub fn at_origin(scale: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale,
        }
    }

    /// Rotation as a quaternion.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix for this transform, in the scene rig's local frame.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.orientation(), self.position)
    }
}

/// Immutable layout attributes sampled once when a particle is spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleLayout {
    /// Resting position in the assembled (tree) layout.
    pub home_primary: Vec3,
    /// Resting position in the dispersed (scattered) layout.
    pub home_secondary: Vec3,
    /// Angular velocity in radians per second, per axis.
    pub spin_rate: Vec3,
    pub base_scale: f32,
    /// Phase offset for the ambient pulse.
    pub phase: f32,
}

/// One particle of the scene.
///
/// Layout fields are private and exposed through getters so they cannot
/// change after construction. Only the engine writes [`ParticleRecord::live`].
#[derive(Debug, Clone)]
pub struct ParticleRecord {
    id: ParticleId,
    kind: ParticleKind,
    layout: ParticleLayout,
    payload: Option<PhotoHandle>,
    pub(crate) live: Transform,
}

impl ParticleRecord {
    pub(crate) fn new(id: ParticleId, kind: ParticleKind, layout: ParticleLayout, payload: Option<PhotoHandle>) -> Self {
        Self {
            id,
            kind,
            layout,
            payload,
            live: Transform::at_origin(layout.base_scale),
        }
    }

    #[inline]
    pub fn id(&self) -> ParticleId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    #[inline]
    pub fn is_ambient(&self) -> bool {
        self.kind.is_ambient()
    }

    #[inline]
    pub fn is_photo(&self) -> bool {
        self.kind == ParticleKind::Photo
    }

    #[inline]
    pub fn layout(&self) -> &ParticleLayout {
        &self.layout
    }

    #[inline]
    pub fn home_primary(&self) -> Vec3 {
        self.layout.home_primary
    }

    #[inline]
    pub fn home_secondary(&self) -> Vec3 {
        self.layout.home_secondary
    }

    #[inline]
    pub fn spin_rate(&self) -> Vec3 {
        self.layout.spin_rate
    }

    #[inline]
    pub fn base_scale(&self) -> f32 {
        self.layout.base_scale
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.layout.phase
    }

    /// Opaque photo content handle, present only for PHOTO particles.
    #[inline]
    pub fn payload(&self) -> Option<PhotoHandle> {
        self.payload
    }

    /// The live transform as of the last engine tick.
    #[inline]
    pub fn live(&self) -> &Transform {
        &self.live
    }
}
