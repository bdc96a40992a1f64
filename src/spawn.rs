//! Seeded placement of particles in the tree and scatter layouts.
//!
//! The sampling functions are pure functions of an RNG, so a fixed seed
//! reproduces the exact same scene. [`SpawnContext`] bundles the RNG with the
//! tree dimensions and builds complete [`ParticleLayout`]s.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

use crate::config::TreeLayout;
use crate::particle::{ParticleKind, ParticleLayout};

/// Turns of the spiral from the base of the tree to its tip, times two.
const SPIRAL_WINDING: f32 = 50.0;
/// Radius never shrinks below this, so the tip is not a single point.
const MIN_SPIRAL_RADIUS: f32 = 0.5;

const DUST_SHELL: (f32, f32) = (12.0, 32.0);
const SCATTER_SHELL: (f32, f32) = (8.0, 20.0);

const SPIN_RANGE: f32 = 2.0;
const PHOTO_SPIN_RANGE: f32 = 0.3;

const DUST_SCALE: f32 = 1.0;
const PHOTO_SCALE: f32 = 0.8;

/// Random point on the tree spiral.
///
/// Height fraction `t = U^0.8` biases particles toward the wide base. The
/// radius shrinks linearly with height and is jittered by ±20%.
pub fn sample_tree_position<R: Rng + ?Sized>(rng: &mut R, tree: &TreeLayout) -> Vec3 {
    let t = rng.gen::<f32>().powf(0.8);
    let y = t * tree.height - tree.height / 2.0;
    let max_radius = (tree.radius * (1.0 - t)).max(MIN_SPIRAL_RADIUS);
    let angle = t * SPIRAL_WINDING * PI + rng.gen::<f32>() * PI;
    let r = max_radius * (0.8 + rng.gen::<f32>() * 0.4);

    Vec3::new(angle.cos() * r, y, angle.sin() * r)
}

/// Random point on a spherical shell around the tree.
///
/// Ambient particles use a wider shell than decorations. Directions are
/// uniform over the sphere (`phi = acos(2U - 1)`).
pub fn sample_scatter_position<R: Rng + ?Sized>(rng: &mut R, ambient: bool) -> Vec3 {
    let (inner, outer) = if ambient { DUST_SHELL } else { SCATTER_SHELL };
    let r = inner + rng.gen::<f32>() * (outer - inner);
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Random angular velocity. Photos turn much more slowly than ornaments.
pub fn sample_spin<R: Rng + ?Sized>(rng: &mut R, kind: ParticleKind) -> Vec3 {
    let range = if kind == ParticleKind::Photo { PHOTO_SPIN_RANGE } else { SPIN_RANGE };
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * range,
        (rng.gen::<f32>() - 0.5) * range,
        (rng.gen::<f32>() - 0.5) * range,
    )
}

/// Pick a decoration kind: 40% leaves, 30% gifts, 25% gold and 5% red baubles.
pub fn sample_decoration_kind<R: Rng + ?Sized>(rng: &mut R) -> ParticleKind {
    let r: f32 = rng.gen();
    if r < 0.4 {
        ParticleKind::Leaf
    } else if r < 0.7 {
        ParticleKind::Gift
    } else if r < 0.95 {
        ParticleKind::Ball
    } else {
        ParticleKind::RedBall
    }
}

/// Nominal size of a freshly spawned particle.
pub fn sample_base_scale<R: Rng + ?Sized>(rng: &mut R, kind: ParticleKind) -> f32 {
    match kind {
        ParticleKind::Dust => DUST_SCALE,
        ParticleKind::Photo => PHOTO_SCALE,
        _ => 0.4 + rng.gen::<f32>() * 0.5,
    }
}

/// RNG plus tree dimensions, handed out by the scene to spawn particles.
pub struct SpawnContext {
    tree: TreeLayout,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context. Without a seed, the clock seeds the RNG so
    /// every run looks different.
    pub fn new(tree: TreeLayout, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            tree,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn tree(&self) -> &TreeLayout {
        &self.tree
    }

    /// Sample a complete layout for a particle of `kind`.
    pub fn layout(&mut self, kind: ParticleKind) -> ParticleLayout {
        let rng = &mut self.rng;
        ParticleLayout {
            home_primary: sample_tree_position(rng, &self.tree),
            home_secondary: sample_scatter_position(rng, kind.is_ambient()),
            spin_rate: sample_spin(rng, kind),
            base_scale: sample_base_scale(rng, kind),
            phase: rng.gen_range(0.0..TAU),
        }
    }

    /// Sample a decoration kind from the tree mix.
    pub fn decoration_kind(&mut self) -> ParticleKind {
        sample_decoration_kind(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(12345)
    }

    #[test]
    fn test_tree_positions_stay_inside_cone() {
        let tree = TreeLayout::default();
        let mut rng = rng();
        for _ in 0..2000 {
            let p = sample_tree_position(&mut rng, &tree);
            assert!(p.y >= -tree.height / 2.0 - 1e-4 && p.y <= tree.height / 2.0 + 1e-4);

            let t = (p.y + tree.height / 2.0) / tree.height;
            let max_radius = (tree.radius * (1.0 - t)).max(MIN_SPIRAL_RADIUS);
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!(r <= max_radius * 1.2 + 1e-3, "radius {} exceeds {}", r, max_radius * 1.2);
        }
    }

    #[test]
    fn test_scatter_positions_on_shell() {
        let mut rng = rng();
        for _ in 0..1000 {
            let r = sample_scatter_position(&mut rng, false).length();
            assert!((8.0 - 1e-3..=20.0 + 1e-3).contains(&r));

            let r = sample_scatter_position(&mut rng, true).length();
            assert!((12.0 - 1e-3..=32.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_photo_spin_is_slower() {
        let mut rng = rng();
        for _ in 0..500 {
            let spin = sample_spin(&mut rng, ParticleKind::Photo);
            assert!(spin.abs().max_element() <= PHOTO_SPIN_RANGE / 2.0);
            let spin = sample_spin(&mut rng, ParticleKind::Gift);
            assert!(spin.abs().max_element() <= SPIN_RANGE / 2.0);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = SpawnContext::new(TreeLayout::default(), Some(99));
        let mut b = SpawnContext::new(TreeLayout::default(), Some(99));
        for _ in 0..10 {
            assert_eq!(a.layout(ParticleKind::Ball), b.layout(ParticleKind::Ball));
        }
    }

    #[test]
    fn test_base_scales() {
        let mut rng = rng();
        assert_eq!(sample_base_scale(&mut rng, ParticleKind::Dust), DUST_SCALE);
        assert_eq!(sample_base_scale(&mut rng, ParticleKind::Photo), PHOTO_SCALE);
        for _ in 0..100 {
            let s = sample_base_scale(&mut rng, ParticleKind::Leaf);
            assert!((0.4..0.9 + 1e-6).contains(&s));
        }
    }

    #[test]
    fn test_decoration_mix_has_no_special_kinds() {
        let mut rng = rng();
        for _ in 0..1000 {
            let kind = sample_decoration_kind(&mut rng);
            assert_ne!(kind, ParticleKind::Dust);
            assert_ne!(kind, ParticleKind::Photo);
        }
    }
}
