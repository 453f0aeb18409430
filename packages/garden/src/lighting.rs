//! Sky colors and scene lighting.
//!
//! The lighting model is deliberately small:
//! - a hemisphere light blending a sky color (from above) and a ground color
//!   (from below)
//! - one white directional sun
//! - exponential squared fog tinted with the sky color
//!
//! Mood picks the sky palette; environment picks the fog density. Colors are
//! authored in sRGB (hex or HSL) and converted to linear RGB here.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::environment::{Environment, Mood};

/// Position of the sun light; it shines toward the origin.
pub const SUN_POSITION: Vec3 = Vec3::new(-25.0, 40.0, -10.0);
pub const SUN_INTENSITY: f32 = 1.4;
pub const HEMISPHERE_INTENSITY: f32 = 1.2;

// ============================================================================
// Color helpers
// ============================================================================

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// Convert a 0xRRGGBB sRGB color to linear RGB.
pub fn srgb_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Convert an sRGB HSL triple (all components 0-1, hue wraps) to linear RGB.
pub fn hsl_to_linear(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        (
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    };

    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

// ============================================================================
// Sky state
// ============================================================================

/// Sky and particle visibility for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    /// Clear color, fog color and hemisphere sky color (linear).
    pub top: Vec3,
    /// Hemisphere ground color (linear).
    pub bottom: Vec3,
    pub star_opacity: f32,
    pub snow_opacity: f32,
}

impl Sky {
    /// Evaluate the mood palette at `t` seconds; the top color pulses slowly.
    pub fn evaluate(mood: Mood, t: f32) -> Self {
        let pulse = ((t * 0.15).sin() + 1.0) * 0.5;
        match mood {
            Mood::Morning => Self {
                top: hsl_to_linear(0.55, 0.55, 0.70 + 0.03 * pulse),
                bottom: hsl_to_linear(0.28, 0.70, 0.55),
                star_opacity: 0.0,
                snow_opacity: 0.7,
            },
            Mood::Sunset => Self {
                top: hsl_to_linear(0.02 + 0.02 * pulse, 0.85, 0.62),
                bottom: hsl_to_linear(0.10, 0.80, 0.47),
                star_opacity: 0.25,
                snow_opacity: 0.6,
            },
            Mood::Night => Self {
                top: hsl_to_linear(0.65, 0.60, 0.23 + 0.04 * pulse),
                bottom: hsl_to_linear(0.69, 0.80, 0.12),
                star_opacity: 0.85,
                snow_opacity: 0.4,
            },
        }
    }
}

/// Fog density for an environment.
pub fn fog_density(environment: Environment) -> f32 {
    match environment {
        Environment::Valley => 0.012,
        Environment::Forest => 0.015,
        Environment::Park => 0.010,
    }
}

// ============================================================================
// GPU Uniforms
// ============================================================================

/// GPU-ready lighting uniforms.
///
/// Laid out for direct upload to a uniform buffer. Total size: 80 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightingUniforms {
    /// Hemisphere sky color (rgb), w = hemisphere intensity.
    pub sky_color: [f32; 4],
    /// Hemisphere ground color (rgb), w unused.
    pub ground_color: [f32; 4],
    /// Direction toward the sun (normalized xyz), w = sun intensity.
    pub sun_direction: [f32; 4],
    /// Sun color (rgb), w unused.
    pub sun_color: [f32; 4],
    /// Fog color (rgb), w = fog density.
    pub fog: [f32; 4],
}

impl LightingUniforms {
    pub fn new(sky: &Sky, fog_density: f32) -> Self {
        let sun = SUN_POSITION.normalize();
        Self {
            sky_color: [sky.top.x, sky.top.y, sky.top.z, HEMISPHERE_INTENSITY],
            ground_color: [sky.bottom.x, sky.bottom.y, sky.bottom.z, 0.0],
            sun_direction: [sun.x, sun.y, sun.z, SUN_INTENSITY],
            sun_color: [1.0, 1.0, 1.0, 0.0],
            fog: [sky.top.x, sky.top.y, sky.top.z, fog_density],
        }
    }
}

impl Default for LightingUniforms {
    fn default() -> Self {
        Self::new(&Sky::evaluate(Mood::default(), 0.0), fog_density(Environment::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<LightingUniforms>(), 80);
    }

    #[test]
    fn test_srgb_hex_endpoints() {
        assert_eq!(srgb_hex(0x000000), Vec3::ZERO);
        let white = srgb_hex(0xffffff);
        assert!((white - Vec3::ONE).abs().max_element() < 1e-5);
        // sRGB mid grey is ~0.214 linear
        assert!((srgb_hex(0x808080).x - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn test_hsl_primary_hues() {
        let red = hsl_to_linear(0.0, 1.0, 0.5);
        assert!((red - Vec3::new(1.0, 0.0, 0.0)).abs().max_element() < 1e-5);
        let blue = hsl_to_linear(2.0 / 3.0, 1.0, 0.5);
        assert!((blue - Vec3::new(0.0, 0.0, 1.0)).abs().max_element() < 1e-5);
        // hue wraps
        assert_eq!(hsl_to_linear(1.25, 0.5, 0.5), hsl_to_linear(0.25, 0.5, 0.5));
    }

    #[test]
    fn test_night_is_darker_than_morning() {
        let morning = Sky::evaluate(Mood::Morning, 0.0);
        let night = Sky::evaluate(Mood::Night, 0.0);
        assert!(night.top.length() < morning.top.length());
        assert_eq!(morning.star_opacity, 0.0);
        assert_eq!(night.star_opacity, 0.85);
        assert_eq!(night.snow_opacity, 0.4);
    }

    #[test]
    fn test_fog_density_per_environment() {
        assert_eq!(fog_density(Environment::Valley), 0.012);
        assert_eq!(fog_density(Environment::Forest), 0.015);
        assert_eq!(fog_density(Environment::Park), 0.010);
    }

    #[test]
    fn test_uniforms_carry_fog_and_sun() {
        let sky = Sky::evaluate(Mood::Sunset, 3.0);
        let u = LightingUniforms::new(&sky, 0.015);
        assert_eq!(u.fog[3], 0.015);
        assert_eq!(u.sun_direction[3], SUN_INTENSITY);
        let dir = Vec3::new(u.sun_direction[0], u.sun_direction[1], u.sun_direction[2]);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y > 0.0);
    }
}
