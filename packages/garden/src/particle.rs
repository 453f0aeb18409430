//! Point particle systems.
//!
//! Particles never simulate: every frame recomputes each position from its
//! fixed base position, the elapsed time and the particle index, so the same
//! `t` always produces the same frame.

use glam::Vec3;
use rand::Rng;

use crate::lighting::srgb_hex;
use crate::scene_graph::Transform;

pub const STAR_COUNT: usize = 260;
pub const SNOW_COUNT: usize = 420;
pub const WATERFALL_COUNT: usize = 900;

/// Per-frame motion rule applied to base positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleMotion {
    /// Slow vertical shimmer.
    Twinkle,
    /// Sideways sway while falling, wrapping every 22 units.
    Drift,
    /// Fast fall, wrapping every 12 units.
    Cascade,
}

impl ParticleMotion {
    /// Position of particle `index` at time `t` seconds.
    pub fn apply(self, base: Vec3, index: usize, t: f32) -> Vec3 {
        let i = index as f32;
        match self {
            ParticleMotion::Twinkle => {
                let flicker = (t * 0.8 + i * 0.37).sin() * 0.9;
                Vec3::new(base.x, base.y + flicker, base.z)
            }
            ParticleMotion::Drift => {
                let fall = (t * 0.7 + i * 0.03) % 22.0;
                let sway = (t * 0.8 + i * 0.15).sin() * 0.4;
                Vec3::new(base.x + sway, base.y - fall, base.z)
            }
            ParticleMotion::Cascade => {
                let fall = (t * 2.0 + i * 0.08) % 12.0;
                Vec3::new(base.x, base.y - fall, base.z)
            }
        }
    }
}

/// A point cloud animated from precomputed base positions.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    /// Base transform for the system.
    pub transform: Transform,
    /// Whether the system is visible.
    pub visible: bool,
    pub motion: ParticleMotion,
    /// World-space point size.
    pub size: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub opacity: f32,
    base: Vec<Vec3>,
    positions: Vec<Vec3>,
}

impl ParticleSystem {
    pub fn new(motion: ParticleMotion, base: Vec<Vec3>, size: f32, color: u32, opacity: f32) -> Self {
        let positions = base.clone();
        Self {
            transform: Transform::default(),
            visible: true,
            motion,
            size,
            color: srgb_hex(color).to_array(),
            opacity,
            base,
            positions,
        }
    }

    /// Star field high above the garden. Starts invisible (opacity follows the mood).
    pub fn stars(rng: &mut impl Rng) -> Self {
        let base = (0..STAR_COUNT)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 220.0,
                    rng.gen::<f32>() * 90.0 + 50.0,
                    (rng.gen::<f32>() - 0.5) * 220.0,
                )
            })
            .collect();
        Self::new(ParticleMotion::Twinkle, base, 0.55, 0xffffff, 0.0)
    }

    /// Drifting snow petals over the whole ground plane.
    pub fn snow(rng: &mut impl Rng) -> Self {
        let base = (0..SNOW_COUNT)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 130.0,
                    rng.gen::<f32>() * 16.0 + 6.0,
                    (rng.gen::<f32>() - 0.5) * 130.0,
                )
            })
            .collect();
        Self::new(ParticleMotion::Drift, base, 0.26, 0xffffff, 0.85)
    }

    /// Falling water droplets; place the system at the top of the fall.
    pub fn waterfall(rng: &mut impl Rng) -> Self {
        let base = (0..WATERFALL_COUNT)
            .map(|_| Vec3::new((rng.gen::<f32>() - 0.5) * 3.0, rng.gen::<f32>() * 12.0, 0.0))
            .collect();
        Self::new(ParticleMotion::Cascade, base, 0.22, 0xe6fbff, 1.0)
    }

    /// Recompute every position for time `t` seconds.
    pub fn update(&mut self, t: f32) {
        let motion = self.motion;
        for (i, (pos, base)) in self.positions.iter_mut().zip(&self.base).enumerate() {
            *pos = motion.apply(*base, i, t);
        }
    }

    /// Current positions in the system's local space.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn base_positions(&self) -> &[Vec3] {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ParticleSystem::stars(&mut rng).len(), STAR_COUNT);
        assert_eq!(ParticleSystem::snow(&mut rng).len(), SNOW_COUNT);
        assert_eq!(ParticleSystem::waterfall(&mut rng).len(), WATERFALL_COUNT);
    }

    #[test]
    fn test_star_twinkle_formula() {
        let base = Vec3::new(1.0, 60.0, -3.0);
        let p = ParticleMotion::Twinkle.apply(base, 4, 2.5);
        let expected = 60.0 + (2.5f32 * 0.8 + 4.0 * 0.37).sin() * 0.9;
        assert!((p.y - expected).abs() < 1e-5);
        assert_eq!(p.x, 1.0);
        assert_eq!(p.z, -3.0);
    }

    #[test]
    fn test_snow_wraps_fall_distance() {
        let base = Vec3::new(0.0, 20.0, 0.0);
        // 0.7 * 40 = 28, wraps to 6
        let p = ParticleMotion::Drift.apply(base, 0, 40.0);
        assert!((p.y - 14.0).abs() < 1e-4);
        assert!((p.x - (32.0f32).sin() * 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_waterfall_stays_within_drop() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut fall = ParticleSystem::waterfall(&mut rng);
        for t in [0.0, 1.3, 9.7, 123.4] {
            fall.update(t);
            for (p, b) in fall.positions().iter().zip(fall.base_positions()) {
                assert!(p.y <= b.y + 1e-6);
                assert!(p.y > b.y - 12.0 - 1e-4);
            }
        }
    }

    #[test]
    fn test_update_is_a_pure_function_of_time() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut snow = ParticleSystem::snow(&mut rng);
        snow.update(5.0);
        let first = snow.positions().to_vec();
        snow.update(11.0);
        snow.update(5.0);
        assert_eq!(first, snow.positions());
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = ParticleSystem::stars(&mut StdRng::seed_from_u64(42));
        let b = ParticleSystem::stars(&mut StdRng::seed_from_u64(42));
        assert_eq!(a.base_positions(), b.base_positions());
    }
}
