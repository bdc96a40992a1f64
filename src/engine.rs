//! Per-frame choreography: retarget every particle and ease it toward its goal.
//!
//! All easing is exponential approach, `x += (target - x) * (1 - e^(-rate * dt))`,
//! which is frame-rate independent, never overshoots and converges
//! asymptotically.
//!
//! The tick does the frame-wide work once (focus projection, rig inversion)
//! and then runs a pure per-particle step that reads only the shared frame
//! data and the record it writes. The step never blocks and never allocates.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::config::ChoreographyParams;
use crate::focus::{invert_rig, FocusProjector, ViewerPose};
use crate::particle::{ParticleId, ParticleRecord};
use crate::policy::{self, Role, RotationPolicy, TargetSelector};
use crate::registry::ParticleRegistry;
use crate::state::{Mode, SharedState};

/// Fraction of the remaining distance covered in `dt` seconds at `rate`.
#[inline]
pub fn ease_factor(rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else {
        1.0 - (-rate * dt).exp()
    }
}

#[inline]
pub fn ease(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * ease_factor(rate, dt)
}

#[inline]
pub fn ease_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current + (target - current) * ease_factor(rate, dt)
}

/// Per-frame inputs from the host loop and renderer.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Wall-clock seconds since the scene started.
    pub elapsed: f32,
    pub viewer: ViewerPose,
    /// World transform of the scene rig that parents every particle.
    pub rig: Mat4,
}

impl FrameInput {
    pub fn new(dt: f32, elapsed: f32, viewer: ViewerPose, rig: Mat4) -> Self {
        Self { dt, elapsed, viewer, rig }
    }
}

/// Frame-wide values shared by every particle step.
struct Frame {
    mode: Mode,
    dt: f32,
    elapsed: f32,
    ambient_visible: bool,
    focus: Option<ParticleId>,
    focus_point: Option<Vec3>,
    /// Viewer position and up vector in rig-local space.
    viewer_local: Option<(Vec3, Vec3)>,
}

/// Drives every particle's live transform from the shared state.
#[derive(Debug, Clone)]
pub struct ChoreographyEngine {
    params: ChoreographyParams,
    projector: FocusProjector,
}

impl ChoreographyEngine {
    pub fn new(params: ChoreographyParams) -> Self {
        Self {
            projector: FocusProjector::new(params.focus_distance),
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &ChoreographyParams {
        &self.params
    }

    #[inline]
    pub fn projector(&self) -> &FocusProjector {
        &self.projector
    }

    /// Advance every particle by one frame.
    pub fn tick(&mut self, input: &FrameInput, state: &SharedState, registry: &mut ParticleRegistry) {
        let mode = state.mode();
        let focus = match mode {
            Mode::Focused => state.focus_target().filter(|&id| registry.contains(id)),
            _ => None,
        };

        if focus.is_none() {
            self.projector.reset();
        }
        let focus_point = focus.and_then(|_| self.projector.project(&input.viewer, &input.rig));
        let viewer_local = focus.and_then(|_| {
            invert_rig(&input.rig).map(|inverse| {
                (
                    inverse.transform_point3(input.viewer.position),
                    inverse.transform_vector3(Vec3::Y),
                )
            })
        });

        let frame = Frame {
            mode,
            dt: input.dt.max(0.0),
            elapsed: input.elapsed,
            ambient_visible: state.options.ambient_visible,
            focus,
            focus_point,
            viewer_local,
        };

        for record in registry.records_mut() {
            step(record, &frame, &self.params);
        }
    }
}

impl Default for ChoreographyEngine {
    fn default() -> Self {
        Self::new(ChoreographyParams::default())
    }
}

fn step(record: &mut ParticleRecord, frame: &Frame, params: &ChoreographyParams) {
    let role = Role::of(frame.focus == Some(record.id()));
    let motion = policy::motion(frame.mode, role);
    let dt = frame.dt;

    // Position
    let target = match motion.target {
        TargetSelector::Primary => record.home_primary(),
        TargetSelector::Secondary => record.home_secondary(),
        TargetSelector::FocusPoint => frame.focus_point.unwrap_or(record.live.position),
    };
    let rate = if motion.fast {
        params.focus_position_rate
    } else {
        params.position_rate
    };
    record.live.position = ease_vec3(record.live.position, target, rate, dt);

    // Rotation
    match motion.rotation {
        RotationPolicy::Spin => {
            record.live.rotation += record.spin_rate() * dt;
        }
        RotationPolicy::Settle | RotationPolicy::FaceViewer => {
            let rotation = &mut record.live.rotation;
            rotation.x = ease(rotation.x, 0.0, params.settle_rate, dt);
            rotation.z = ease(rotation.z, 0.0, params.settle_rate, dt);
            rotation.y += params.idle_spin * dt;
        }
    }
    if motion.rotation == RotationPolicy::FaceViewer {
        if let Some(facing) = frame
            .viewer_local
            .and_then(|(eye, up)| look_at_euler(record.live.position, eye, up))
        {
            record.live.rotation = facing;
        }
    }

    // Scale
    let scale = policy::scale_policy(frame.mode, role, record.kind(), frame.ambient_visible, params).resolve(
        record.base_scale(),
        record.phase(),
        frame.elapsed,
        params.pulse_frequency,
    );
    record.live.scale = ease(record.live.scale, scale, params.scale_rate, dt);
}

/// XYZ euler angles that turn local +Z from `from` toward `eye`.
///
/// `None` when the eye coincides with `from` or lies straight along `up`.
pub fn look_at_euler(from: Vec3, eye: Vec3, up: Vec3) -> Option<Vec3> {
    let z = (eye - from).try_normalize()?;
    let x = up.cross(z).try_normalize()?;
    let y = z.cross(x);
    let orientation = Quat::from_mat3(&Mat3::from_cols(x, y, z));
    let (a, b, c) = orientation.to_euler(EulerRot::XYZ);
    Some(Vec3::new(a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{ParticleKind, ParticleLayout};
    use crate::photos::PhotoHandle;

    fn layout(primary: Vec3, secondary: Vec3) -> ParticleLayout {
        ParticleLayout {
            home_primary: primary,
            home_secondary: secondary,
            spin_rate: Vec3::new(1.0, -0.5, 0.25),
            base_scale: 0.5,
            phase: 0.0,
        }
    }

    fn frame(dt: f32) -> FrameInput {
        FrameInput::new(dt, 0.0, ViewerPose::default(), Mat4::IDENTITY)
    }

    #[test]
    fn test_ease_factor() {
        assert_eq!(ease_factor(2.0, 0.0), 0.0);
        assert_eq!(ease_factor(2.0, -1.0), 0.0);
        assert!((ease_factor(2.0, 0.1) - (1.0 - (-0.2f32).exp())).abs() < 1e-7);
        assert!(ease_factor(100.0, 100.0) <= 1.0);
    }

    #[test]
    fn test_single_tick_toward_tree_home() {
        let mut registry = ParticleRegistry::new();
        let id = registry.insert(ParticleKind::Ball, layout(Vec3::new(3.0, 0.0, 4.0), Vec3::ZERO), None);
        let state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        engine.tick(&frame(0.1), &state, &mut registry);

        let p = registry.get(id).unwrap().live().position;
        assert!((p.x - 0.5438).abs() < 1e-3, "x = {}", p.x);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 0.7251).abs() < 1e-3, "z = {}", p.z);
    }

    #[test]
    fn test_easing_converges() {
        let mut registry = ParticleRegistry::new();
        let home = Vec3::new(-6.0, 8.0, 2.0);
        let id = registry.insert(ParticleKind::Leaf, layout(home, Vec3::ZERO), None);
        let state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        let initial = home.length();
        // rate * dt summed = 2 * 0.05 * 50 = 5
        for _ in 0..50 {
            engine.tick(&frame(0.05), &state, &mut registry);
        }
        let remaining = (registry.get(id).unwrap().live().position - home).length();
        assert!(remaining < 1e-2 * initial, "remaining {}", remaining);
    }

    #[test]
    fn test_dispersed_spins_and_assembled_settles() {
        let mut registry = ParticleRegistry::new();
        let id = registry.insert(ParticleKind::Gift, layout(Vec3::ZERO, Vec3::X * 10.0), None);
        let mut state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        state.set_mode(Mode::Dispersed);
        engine.tick(&frame(0.5), &state, &mut registry);
        let r = registry.get(id).unwrap().live().rotation;
        assert!((r - Vec3::new(0.5, -0.25, 0.125)).length() < 1e-6);

        state.set_mode(Mode::Assembled);
        engine.tick(&frame(0.5), &state, &mut registry);
        let settled = registry.get(id).unwrap().live().rotation;
        let keep = (-0.5f32).exp();
        assert!((settled.x - 0.5 * keep).abs() < 1e-5);
        assert!((settled.z - 0.125 * keep).abs() < 1e-5);
        assert!((settled.y - (-0.25 + 0.25)).abs() < 1e-5);
    }

    #[test]
    fn test_focus_target_moves_in_front_of_viewer_and_faces_it() {
        let mut registry = ParticleRegistry::new();
        let photo = registry.insert(
            ParticleKind::Photo,
            layout(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -15.0)),
            Some(PhotoHandle::new(0)),
        );
        let other = registry.insert(ParticleKind::Leaf, layout(Vec3::ZERO, Vec3::new(9.0, 0.0, 0.0)), None);

        let mut state = SharedState::default();
        state.focus(Some(photo));
        let mut engine = ChoreographyEngine::default();

        for _ in 0..120 {
            engine.tick(&frame(1.0 / 60.0), &state, &mut registry);
        }

        let focused = registry.get(photo).unwrap().live();
        let focus_point = Vec3::new(0.0, 2.0, 30.0);
        assert!((focused.position - focus_point).length() < 0.01 * focus_point.length());

        let facing = focused.orientation() * Vec3::Z;
        let to_viewer = (ViewerPose::default().position - focused.position).normalize();
        assert!(facing.dot(to_viewer) > 0.999);

        // Converging toward 4.5 from the base scale
        assert!(focused.scale > 4.0);

        let background = registry.get(other).unwrap().live();
        assert!((background.position - Vec3::new(9.0, 0.0, 0.0)).length() < 1.0);
        assert!((background.scale - 0.4).abs() < 0.01);
    }

    #[test]
    fn test_focus_without_target_scatters_everything() {
        let mut registry = ParticleRegistry::new();
        let a = registry.insert(ParticleKind::Photo, layout(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0)), None);
        let b = registry.insert(ParticleKind::Ball, layout(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)), None);

        let mut state = SharedState::default();
        state.focus(None);
        let mut engine = ChoreographyEngine::default();
        for _ in 0..300 {
            engine.tick(&frame(1.0 / 60.0), &state, &mut registry);
        }

        for id in [a, b] {
            let record = registry.get(id).unwrap();
            assert!((record.live().position - record.home_secondary()).length() < 0.05);
        }
        assert!(engine.projector().held().is_none());
    }

    #[test]
    fn test_new_focus_episode_does_not_reuse_old_target() {
        let mut registry = ParticleRegistry::new();
        let a = registry.insert(ParticleKind::Photo, layout(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0)), None);
        let b = registry.insert(ParticleKind::Photo, layout(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)), None);
        let mut state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        state.focus(Some(a));
        engine.tick(&frame(1.0 / 60.0), &state, &mut registry);
        assert!(engine.projector().held().is_some());

        state.set_mode(Mode::Dispersed);
        engine.tick(&frame(1.0 / 60.0), &state, &mut registry);
        assert!(engine.projector().held().is_none());

        // Degenerate rig on the first frame of the next episode: nothing to hold
        state.focus(Some(b));
        let before = registry.get(b).unwrap().live().position;
        let input = FrameInput {
            rig: Mat4::ZERO,
            ..frame(1.0 / 60.0)
        };
        engine.tick(&input, &state, &mut registry);
        assert!(engine.projector().held().is_none());
        let after = registry.get(b).unwrap().live().position;
        assert!((after - before).length() < 1e-5);
    }

    #[test]
    fn test_ambient_collapses_when_assembled_or_hidden() {
        let mut registry = ParticleRegistry::new();
        let dust = registry.insert(ParticleKind::Dust, layout(Vec3::ZERO, Vec3::ONE), None);
        let mut state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        for _ in 0..200 {
            engine.tick(&frame(0.05), &state, &mut registry);
        }
        assert!(registry.get(dust).unwrap().live().scale < 1e-3);

        state.set_mode(Mode::Dispersed);
        for _ in 0..200 {
            engine.tick(&frame(0.05), &state, &mut registry);
        }
        assert!(registry.get(dust).unwrap().live().scale > 0.1);

        state.options.ambient_visible = false;
        for _ in 0..200 {
            engine.tick(&frame(0.05), &state, &mut registry);
        }
        assert!(registry.get(dust).unwrap().live().scale < 1e-3);
    }

    #[test]
    fn test_photo_grows_when_dispersed() {
        let mut registry = ParticleRegistry::new();
        let photo = registry.insert(ParticleKind::Photo, layout(Vec3::ZERO, Vec3::ONE), None);
        let mut state = SharedState::default();
        state.set_mode(Mode::Dispersed);
        let mut engine = ChoreographyEngine::default();

        for _ in 0..100 {
            engine.tick(&frame(0.05), &state, &mut registry);
        }
        assert!((registry.get(photo).unwrap().live().scale - 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_zero_and_negative_dt_change_nothing() {
        let mut registry = ParticleRegistry::new();
        let id = registry.insert(ParticleKind::Leaf, layout(Vec3::ONE, Vec3::ONE), None);
        let state = SharedState::default();
        let mut engine = ChoreographyEngine::default();

        let before = *registry.get(id).unwrap().live();
        engine.tick(&frame(0.0), &state, &mut registry);
        engine.tick(&frame(-0.5), &state, &mut registry);
        assert_eq!(*registry.get(id).unwrap().live(), before);
    }

    #[test]
    fn test_look_at_degenerate() {
        assert!(look_at_euler(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        assert!(look_at_euler(Vec3::ZERO, Vec3::Y * 5.0, Vec3::Y).is_none());
        let r = look_at_euler(Vec3::ZERO, Vec3::Z * 5.0, Vec3::Y).unwrap();
        assert!(r.length() < 1e-5);
    }
}
