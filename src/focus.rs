//! Placement of the focused particle in front of the viewer.

use glam::{Mat4, Vec3};

use crate::config::FOCUS_DISTANCE;

/// Determinants smaller than this are treated as a collapsed rig.
const MIN_DETERMINANT: f32 = 1e-8;

/// Viewer position and facing, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    pub position: Vec3,
    /// Unit vector the viewer looks along.
    pub forward: Vec3,
}

impl ViewerPose {
    /// Create a pose. `forward` is normalized; a zero vector falls back to -Z.
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self::new(position, target - position)
    }
}

impl Default for ViewerPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 50.0), Vec3::NEG_Z)
    }
}

/// Invert a rig transform, or `None` if it has collapsed.
pub fn invert_rig(rig: &Mat4) -> Option<Mat4> {
    let det = rig.determinant();
    if !det.is_finite() || det.abs() < MIN_DETERMINANT {
        return None;
    }
    let inverse = rig.inverse();
    inverse.is_finite().then_some(inverse)
}

/// Computes where the focused particle should sit, in rig-local space.
///
/// The target is a point a fixed distance along the viewer's forward
/// direction, mapped through the inverse of the rotating rig so the particle
/// stays put on screen while the rig turns. Both inputs change every frame,
/// so the projection is recomputed every frame.
#[derive(Debug, Clone)]
pub struct FocusProjector {
    distance: f32,
    held: Option<Vec3>,
    degenerate: bool,
}

impl FocusProjector {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            held: None,
            degenerate: false,
        }
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// The last successfully projected target.
    #[inline]
    pub fn held(&self) -> Option<Vec3> {
        self.held
    }

    /// Forget the held target when a focus episode ends.
    pub fn reset(&mut self) {
        self.held = None;
        self.degenerate = false;
    }

    /// Project the focus point for this frame.
    ///
    /// If the rig cannot be inverted the previously held target is returned
    /// instead. `None` means nothing has been projected yet.
    pub fn project(&mut self, viewer: &ViewerPose, rig: &Mat4) -> Option<Vec3> {
        let world = viewer.position + viewer.forward * self.distance;
        match invert_rig(rig) {
            Some(inverse) => {
                self.degenerate = false;
                let local = inverse.transform_point3(world);
                self.held = Some(local);
                Some(local)
            }
            None => {
                if !self.degenerate {
                    log::warn!("scene rig is not invertible; holding focus target {:?}", self.held);
                    self.degenerate = true;
                }
                self.held
            }
        }
    }
}

impl Default for FocusProjector {
    fn default() -> Self {
        Self::new(FOCUS_DISTANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_rig_projects_along_forward() {
        let mut projector = FocusProjector::default();
        let viewer = ViewerPose::new(Vec3::new(0.0, 2.0, 50.0), Vec3::NEG_Z);
        let target = projector.project(&viewer, &Mat4::IDENTITY).unwrap();
        assert!((target - Vec3::new(0.0, 2.0, 30.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotated_rig_maps_into_local_frame() {
        let mut projector = FocusProjector::default();
        let viewer = ViewerPose::new(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z);
        let rig = Mat4::from_quat(Quat::from_rotation_y(FRAC_PI_2));

        let local = projector.project(&viewer, &rig).unwrap();
        // Mapping back through the rig lands on the world-space focus point.
        let world = rig.transform_point3(local);
        assert!((world - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-3);
        // Rotating +90 degrees about Y sends local -X to world +Z.
        assert!((local - Vec3::new(-30.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_degenerate_rig_holds_previous_target() {
        let mut projector = FocusProjector::default();
        let viewer = ViewerPose::default();

        assert_eq!(projector.project(&viewer, &Mat4::ZERO), None);

        let good = projector.project(&viewer, &Mat4::IDENTITY).unwrap();
        let moved = ViewerPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
        assert_eq!(projector.project(&moved, &Mat4::ZERO), Some(good));
        assert_eq!(projector.project(&moved, &Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))), Some(good));

        let nan = Mat4::from_cols_array(&[f32::NAN; 16]);
        assert_eq!(projector.project(&moved, &nan), Some(good));
    }

    #[test]
    fn test_reset_forgets_held_target() {
        let mut projector = FocusProjector::default();
        let viewer = ViewerPose::default();
        assert!(projector.project(&viewer, &Mat4::IDENTITY).is_some());

        projector.reset();
        assert_eq!(projector.held(), None);
        assert_eq!(projector.project(&viewer, &Mat4::ZERO), None);
    }

    #[test]
    fn test_zero_forward_falls_back() {
        let viewer = ViewerPose::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(viewer.forward, Vec3::NEG_Z);
        let viewer = ViewerPose::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((viewer.forward - Vec3::NEG_Z).length() < 1e-6);
    }
}
