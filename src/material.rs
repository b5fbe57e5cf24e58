//! Shading material embedded in spheres and triangles.

use glam::Vec3;
use serde::Deserialize;

/// Surface material: a diffuse/specular mix with optional emission.
///
/// `specular_probability` selects, per bounce, whether the scattered ray is
/// a perfect mirror reflection (`smoothness` controls how much it deviates
/// from a pure mirror) or a cosine-weighted diffuse bounce.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: Vec3,
    pub emission_color: Vec3,
    pub emission_strength: f32,
    pub smoothness: f32,
    pub specular_probability: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.8),
            emission_color: Vec3::ZERO,
            emission_strength: 0.0,
            smoothness: 0.0,
            specular_probability: 0.0,
        }
    }
}

impl Material {
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn emissive(emission_color: Vec3, strength: f32) -> Self {
        Self {
            color: Vec3::ZERO,
            emission_color,
            emission_strength: strength,
            ..Default::default()
        }
    }

    /// Emissive power used for next-event-estimation light selection:
    /// radiant intensity weighted by perceived brightness.
    pub fn emission_luminance(&self) -> f32 {
        luminance(self.emission_color) * self.emission_strength
    }

    /// Clamp fields into their documented ranges. The manifest is untrusted
    /// input; callers should run this once after deserialization.
    pub fn clamped(self) -> Self {
        Self {
            color: self.color.clamp(Vec3::ZERO, Vec3::ONE),
            emission_color: self.emission_color.max(Vec3::ZERO),
            emission_strength: self.emission_strength.max(0.0),
            smoothness: self.smoothness.clamp(0.0, 1.0),
            specular_probability: self.specular_probability.clamp(0.0, 1.0),
        }
    }
}

/// Perceived brightness of a linear RGB color.
#[inline]
pub fn luminance(c: Vec3) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_clips_out_of_range_fields() {
        let m = Material {
            color: Vec3::new(1.5, -0.2, 0.5),
            smoothness: 2.0,
            specular_probability: -1.0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(m.color, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(m.smoothness, 1.0);
        assert_eq!(m.specular_probability, 0.0);
    }

    #[test]
    fn luminance_matches_rec709_weights() {
        assert!((luminance(Vec3::new(1.0, 0.0, 0.0)) - 0.2126).abs() < 1e-6);
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
    }
}
