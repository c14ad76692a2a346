/// Deterministic procedural splat clouds
/// Stands in for a file loader in the viewer, benches and tests
use super::Splat;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Procedural cloud parameters
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Number of splats to generate
    pub splat_count: usize,
    /// RNG seed; equal seeds produce identical clouds
    pub seed: u64,
    /// Center of the cloud in world space
    pub center: Vec3,
    /// Radius of the spherical volume the positions are drawn from
    pub radius: f32,
    /// Inclusive range for per-splat scale
    pub scale_range: (f32, f32),
    /// Inclusive range for per-splat alpha
    pub alpha_range: (f32, f32),
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            splat_count: 200_000,
            seed: 0x5eed,
            center: Vec3::ZERO,
            radius: 2.0,
            scale_range: (0.002, 0.01),
            alpha_range: (0.4, 1.0),
        }
    }
}

/// Generate a cloud of splats uniformly distributed inside a sphere.
///
/// Colors follow position so structure is visible while flying around:
/// each channel maps one normalized axis from [-1, 1] to [0, 1].
pub fn generate_cloud(config: &SceneConfig) -> Vec<Splat> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let radius = config.radius.max(f32::EPSILON);

    let (scale_lo, scale_hi) = ordered(config.scale_range);
    let (alpha_lo, alpha_hi) = ordered(config.alpha_range);

    let mut splats = Vec::with_capacity(config.splat_count);
    while splats.len() < config.splat_count {
        // Rejection sampling inside the unit ball
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() > 1.0 {
            continue;
        }

        let direction = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let color = (p + Vec3::ONE) * 0.5;
        let alpha = rng.gen_range(alpha_lo..=alpha_hi);
        let scale = rng.gen_range(scale_lo..=scale_hi);

        splats.push(Splat::new(config.center + p * radius, direction, color, alpha, scale));
    }

    splats
}

#[inline]
fn ordered((a, b): (f32, f32)) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
