//! GPU-ready per-frame output for the renderer.
//!
//! The renderer owns the pipeline; the core only hands it tightly packed
//! `Pod` data it can upload as-is.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::particle::ParticleRecord;
use crate::registry::ParticleRegistry;

/// One particle instance: world model matrix plus identity.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Raw [`ParticleId`](crate::ParticleId), for mapping back to drawables.
    pub id: u32,
    /// Raw [`ParticleKind`](crate::ParticleKind) index.
    pub kind: u32,
    pub scale: f32,
    pub _pad: f32,
}

impl InstanceRaw {
    /// Pack a record's live transform, placed in the world by `rig`.
    pub fn from_record(record: &ParticleRecord, rig: &Mat4) -> Self {
        let live = record.live();
        Self {
            model: (*rig * live.matrix()).to_cols_array_2d(),
            id: record.id().raw(),
            kind: record.kind().into(),
            scale: live.scale,
            _pad: 0.0,
        }
    }
}

/// Per-frame camera uniforms.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub delta_time: f32,
    pub _padding: [f32; 2],
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4, time: f32, delta_time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            time,
            delta_time,
            _padding: [0.0; 2],
        }
    }
}

/// Refill `out` with one instance per particle, skipping those that have
/// shrunk to nothing.
pub fn write_instances(registry: &ParticleRegistry, rig: &Mat4, out: &mut Vec<InstanceRaw>) {
    out.clear();
    out.extend(
        registry
            .iter()
            .filter(|r| r.live().scale > f32::EPSILON)
            .map(|r| InstanceRaw::from_record(r, rig)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{ParticleKind, ParticleLayout};
    use glam::Vec3;

    fn layout(scale: f32) -> ParticleLayout {
        ParticleLayout {
            home_primary: Vec3::ZERO,
            home_secondary: Vec3::ZERO,
            spin_rate: Vec3::ZERO,
            base_scale: scale,
            phase: 0.0,
        }
    }

    #[test]
    fn test_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 80);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
    }

    #[test]
    fn test_write_instances_skips_invisible() {
        let mut registry = ParticleRegistry::new();
        let visible = registry.insert(ParticleKind::Gift, layout(0.5), None);
        registry.insert(ParticleKind::Dust, layout(0.0), None);

        let mut out = vec![InstanceRaw::zeroed(); 8];
        write_instances(&registry, &Mat4::IDENTITY, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, visible.raw());
        assert_eq!(out[0].kind, u32::from(ParticleKind::Gift));
        assert_eq!(out[0].scale, 0.5);

        let bytes: &[u8] = bytemuck::cast_slice(&out);
        assert_eq!(bytes.len(), 80);
    }

    #[test]
    fn test_rig_is_applied() {
        let mut registry = ParticleRegistry::new();
        registry.insert(ParticleKind::Ball, layout(1.0), None);
        let rig = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));

        let mut out = Vec::new();
        write_instances(&registry, &rig, &mut out);
        let model = Mat4::from_cols_array_2d(&out[0].model);
        let origin = model.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-6);
    }
}
