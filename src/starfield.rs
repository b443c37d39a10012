//! Static background star layers.

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::config::{LayerStyle, SceneConfig};
use crate::particle::random_in_cube;

#[derive(Debug, Clone)]
pub struct StarLayer {
    pub style: LayerStyle,
    positions: Vec<Vec3>,
    /// Optional per-star size attribute in [0, 1).
    sizes: Option<Vec<f32>>,
}

impl StarLayer {
    fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        extent: f32,
        style: LayerStyle,
        with_sizes: bool,
    ) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut sizes = with_sizes.then(|| Vec::with_capacity(count));
        for _ in 0..count {
            positions.push(random_in_cube(rng, extent));
            if let Some(sizes) = sizes.as_mut() {
                sizes.push(rng.gen::<f32>());
            }
        }
        Self {
            style,
            positions,
            sizes,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn sizes(&self) -> Option<&[f32]> {
        self.sizes.as_deref()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Starfield {
    /// Medium stars; this layer rotates.
    pub stars: StarLayer,
    /// Tiny static sparkles.
    pub sparkles: StarLayer,
    rotation_speed: f32,
    rotation_y: f32,
}

impl Starfield {
    pub fn new<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let stars = StarLayer::generate(
            rng,
            config.star_count,
            config.star_extent,
            config.star_style,
            true,
        );
        let sparkles = StarLayer::generate(
            rng,
            config.sparkle_count,
            config.sparkle_extent,
            config.sparkle_style,
            false,
        );
        Self {
            stars,
            sparkles,
            rotation_speed: config.star_rotation_speed,
            rotation_y: 0.0,
        }
    }

    pub fn update(&mut self, time: f32) {
        self.rotation_y = time * self.rotation_speed;
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Model matrix for the rotating star layer.
    pub fn star_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        SceneConfig {
            star_count: 300,
            sparkle_count: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_layer_counts_and_bounds() {
        let field = Starfield::new(&small_config(), &mut SmallRng::seed_from_u64(1));
        assert_eq!(field.stars.len(), 300);
        assert_eq!(field.sparkles.len(), 200);
        assert!(field.stars.positions().iter().all(|p| p.abs().max_element() <= 200.0));
        assert!(field.sparkles.positions().iter().all(|p| p.abs().max_element() <= 150.0));
        assert_eq!(field.stars.sizes().map(|s| s.len()), Some(300));
        assert!(field.sparkles.sizes().is_none());
        assert_eq!(field.stars.style.opacity, 0.8);
        assert_eq!(field.sparkles.style.size, 0.08);
    }

    #[test]
    fn test_rotation_tracks_time() {
        let mut field = Starfield::new(&small_config(), &mut SmallRng::seed_from_u64(1));
        field.update(100.0);
        assert!((field.rotation_y() - 1.0).abs() < 1e-6);
        let rotated = field.star_transform().transform_point3(Vec3::X);
        assert!((rotated - Vec3::new(1.0_f32.cos(), 0.0, -1.0_f32.sin())).length() < 1e-5);
    }
}
