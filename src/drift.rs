//! Idle floating layer.
//!
//! Particles rise at their own constant speed and sway horizontally with a
//! per-particle phase. Leaving the top of the volume wraps a particle to the
//! bottom; only the Y axis wraps.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{LayerStyle, SceneConfig};
use crate::particle::random_in_cube;

#[derive(Debug, Clone, Copy)]
struct Drift {
    rise: f32,
    phase: f32,
}

#[derive(Debug, Clone)]
pub struct DriftLayer {
    pub style: LayerStyle,
    positions: Vec<Vec3>,
    drifts: Vec<Drift>,
    /// Half the vertical extent.
    bound: f32,
    sway: f32,
}

impl DriftLayer {
    pub fn new<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let [rise_min, rise_max] = config.drift_rise;
        let mut positions = Vec::with_capacity(config.drift_count);
        let mut drifts = Vec::with_capacity(config.drift_count);
        for _ in 0..config.drift_count {
            positions.push(random_in_cube(rng, config.drift_extent));
            drifts.push(Drift {
                rise: rise_min + rng.gen::<f32>() * (rise_max - rise_min),
                phase: rng.gen::<f32>() * TAU,
            });
        }
        Self {
            style: config.drift_style,
            positions,
            drifts,
            bound: config.drift_extent / 2.0,
            sway: config.drift_sway,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// One render-frame step at wall-clock `time`.
    pub fn step(&mut self, time: f32) {
        for (position, drift) in self.positions.iter_mut().zip(&self.drifts) {
            position.y += drift.rise;
            if position.y > self.bound {
                position.y = -self.bound;
            }
            position.x += (time + drift.phase).sin() * self.sway;
        }
    }
}
