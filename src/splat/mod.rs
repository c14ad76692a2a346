/// Splat primitive: a colored, translucent disc anchored at a world position
pub mod scene;

use glam::Vec3;

pub use scene::{generate_cloud, SceneConfig};

/// Scale substituted for non-positive (or NaN) input scales
pub const DEFAULT_SCALE: f32 = 1.0;

/// Point primitive consumed by the rasterizer.
///
/// Fields are validated once at construction and never mutated afterwards;
/// the renderer only reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    position: Vec3,
    direction: Vec3,
    color: Vec3,
    alpha: f32,
    scale: f32,
}

impl Splat {
    /// Build a splat, clamping color/alpha to [0, 1], normalizing the
    /// direction (zero if degenerate) and replacing a non-positive scale
    /// with `DEFAULT_SCALE`.
    pub fn new(position: Vec3, direction: Vec3, color: Vec3, alpha: f32, scale: f32) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            color: color.clamp(Vec3::ZERO, Vec3::ONE),
            alpha: alpha.max(0.0).min(1.0),
            scale: if scale > 0.0 { scale } else { DEFAULT_SCALE },
        }
    }

    /// Splat without an orientation.
    pub fn point(position: Vec3, color: Vec3, alpha: f32, scale: f32) -> Self {
        Self::new(position, Vec3::ZERO, color, alpha, scale)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Surface direction. Carried for future lighting, not used by rendering.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_clamps_color_and_alpha() {
        let splat = Splat::point(Vec3::ZERO, Vec3::new(-0.5, 0.5, 2.0), 1.5, 1.0);
        assert_eq!(splat.color(), Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(splat.alpha(), 1.0);

        let splat = Splat::point(Vec3::ZERO, Vec3::ONE, -3.0, 1.0);
        assert_eq!(splat.alpha(), 0.0);
    }

    #[test]
    fn non_positive_scale_falls_back_to_default() {
        assert_eq!(Splat::point(Vec3::ZERO, Vec3::ONE, 1.0, 0.0).scale(), DEFAULT_SCALE);
        assert_eq!(Splat::point(Vec3::ZERO, Vec3::ONE, 1.0, -2.0).scale(), DEFAULT_SCALE);
        assert_eq!(Splat::point(Vec3::ZERO, Vec3::ONE, 1.0, f32::NAN).scale(), DEFAULT_SCALE);
        assert_eq!(Splat::point(Vec3::ZERO, Vec3::ONE, 1.0, 0.25).scale(), 0.25);
    }

    #[test]
    fn direction_is_normalized_or_zero() {
        let splat = Splat::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0), Vec3::ONE, 1.0, 1.0);
        assert!((splat.direction().length() - 1.0).abs() < 1e-6);

        let splat = Splat::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 1.0, 1.0);
        assert_eq!(splat.direction(), Vec3::ZERO);
    }
}
