//! Rotation of the scene rig that parents every particle.
//!
//! While assembled the tree turns slowly on its own (if auto-rotate is on).
//! While dispersed, a detected hand steers the rig: horizontal position sets
//! yaw and vertical position sets pitch. Otherwise the rig eases back to rest.

use std::f32::consts::PI;

use glam::{Mat4, Quat};

use crate::config::RigParams;
use crate::engine::ease;
use crate::state::{GroupRotation, Mode, SharedState};

/// Rotation the rig is heading toward this frame.
pub fn rig_target(state: &SharedState, params: &RigParams, elapsed: f32) -> GroupRotation {
    if state.input.detected && state.mode() == Mode::Dispersed {
        return GroupRotation {
            x: state.input.y * PI * params.steer_pitch,
            y: state.input.x * PI * params.steer_yaw,
        };
    }

    let y = if state.mode() == Mode::Assembled && state.options.auto_rotate {
        elapsed * params.auto_rotate_speed
    } else {
        0.0
    };
    GroupRotation { x: 0.0, y }
}

/// Ease the shared rig rotation toward its target.
pub fn update_rig(state: &mut SharedState, params: &RigParams, elapsed: f32, dt: f32) {
    let target = rig_target(state, params, elapsed);
    state.rotation.x = ease(state.rotation.x, target.x, params.rate, dt);
    state.rotation.y = ease(state.rotation.y, target.y, params.rate, dt);
}

/// World transform of the rig for a rotation.
pub fn rig_matrix(rotation: GroupRotation) -> Mat4 {
    Mat4::from_quat(Quat::from_rotation_x(rotation.x) * Quat::from_rotation_y(rotation.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InputSignal;
    use glam::Vec3;

    #[test]
    fn test_auto_rotate_only_when_assembled() {
        let params = RigParams::default();
        let mut state = SharedState::default();
        let target = rig_target(&state, &params, 10.0);
        assert!((target.y - 10.0 * params.auto_rotate_speed).abs() < 1e-6);

        state.options.auto_rotate = false;
        assert_eq!(rig_target(&state, &params, 10.0), GroupRotation::default());

        state.options.auto_rotate = true;
        state.set_mode(Mode::Dispersed);
        assert_eq!(rig_target(&state, &params, 10.0), GroupRotation::default());
    }

    #[test]
    fn test_hand_steers_when_dispersed() {
        let params = RigParams::default();
        let mut state = SharedState::default();
        state.input = InputSignal::at(1.0, -1.0);

        // Assembled ignores the hand
        let target = rig_target(&state, &params, 0.0);
        assert_eq!(target.x, 0.0);

        state.set_mode(Mode::Dispersed);
        let target = rig_target(&state, &params, 0.0);
        assert!((target.y - PI * params.steer_yaw).abs() < 1e-6);
        assert!((target.x + PI * params.steer_pitch).abs() < 1e-6);

        state.input = state.input.lost();
        assert_eq!(rig_target(&state, &params, 0.0), GroupRotation::default());
    }

    #[test]
    fn test_update_converges() {
        let params = RigParams::default();
        let mut state = SharedState::default();
        state.set_mode(Mode::Dispersed);
        state.input = InputSignal::at(0.5, 0.0);
        for _ in 0..300 {
            update_rig(&mut state, &params, 0.0, 1.0 / 60.0);
        }
        assert!((state.rotation.y - 0.5 * PI * params.steer_yaw).abs() < 1e-3);
        assert!(state.rotation.x.abs() < 1e-6);
    }

    #[test]
    fn test_rig_matrix_is_rigid() {
        let m = rig_matrix(GroupRotation { x: 0.3, y: 1.2 });
        assert!((m.determinant() - 1.0).abs() < 1e-5);
        let v = m.transform_vector3(Vec3::new(1.0, 2.0, 3.0));
        assert!((v.length() - Vec3::new(1.0, 2.0, 3.0).length()).abs() < 1e-5);
    }
}
