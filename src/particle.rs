//! Particle burst effects and shared particle helpers.
//!
//! A burst starts every particle at its origin with a velocity drawn
//! uniformly by volume inside a sphere, then expands and fades over a fixed
//! number of steps. Steps are tied to the render frame, not wall time.
//! Live bursts sit in a [`BurstList`] that the session steps once per frame.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

use crate::config::BurstSpec;

/// Vertex data for point sprites.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub size: f32,
}

/// Uniform point in an axis-aligned cube of side `extent` centred on the origin.
pub fn random_in_cube<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * extent,
        (rng.gen::<f32>() - 0.5) * extent,
        (rng.gen::<f32>() - 0.5) * extent,
    )
}

/// Velocity uniform by volume inside a sphere of radius `spread`.
///
/// The cube root on the radius compensates for shell volume growing with r².
pub fn sample_sphere_velocity<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> Vec3 {
    let r = rng.gen::<f32>().cbrt() * spread;
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Per-burst stepping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstMotion {
    /// Elapsed-time increment per step.
    pub step: f32,
    /// Fraction of the velocity applied per step.
    pub speed: f32,
    /// Packed `0xRRGGBB` colour.
    pub color: u32,
}

#[derive(Debug, Clone)]
pub struct Burst {
    pub origin: Vec3,
    pub size: f32,
    pub color: u32,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    step: f32,
    speed: f32,
    steps_taken: u32,
    lifetime_steps: u32,
}

impl Burst {
    pub fn spawn<R: Rng + ?Sized>(params: &BurstSpec, motion: BurstMotion, rng: &mut R) -> Self {
        let velocities: Vec<Vec3> = (0..params.count)
            .map(|_| sample_sphere_velocity(rng, params.spread))
            .collect();

        Self {
            origin: params.origin,
            size: params.size,
            color: motion.color,
            positions: vec![params.origin; params.count],
            velocities,
            step: motion.step,
            speed: motion.speed,
            steps_taken: 0,
            lifetime_steps: (1.0 / motion.step).round().max(1.0) as u32,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.steps_taken as f32 * self.step
    }

    /// Linear fade, `1 - elapsed`.
    pub fn opacity(&self) -> f32 {
        (1.0 - self.elapsed()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.steps_taken >= self.lifetime_steps
    }

    /// Advance every particle by one fixed step.
    pub fn step(&mut self) {
        for (position, velocity) in self.positions.iter_mut().zip(&self.velocities) {
            *position += *velocity * self.speed;
        }
        self.steps_taken += 1;
    }

    pub fn vertices(&self) -> Vec<PointVertex> {
        self.positions
            .iter()
            .map(|p| PointVertex {
                position: p.to_array(),
                size: self.size,
            })
            .collect()
    }
}

/// All live bursts, stepped together once per frame.
#[derive(Debug, Clone, Default)]
pub struct BurstList {
    bursts: Vec<Burst>,
}

impl BurstList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<R: Rng + ?Sized>(&mut self, params: &BurstSpec, motion: BurstMotion, rng: &mut R) {
        log::debug!(
            "Burst of {} particles at ({:.1}, {:.1}, {:.1})",
            params.count,
            params.origin.x,
            params.origin.y,
            params.origin.z
        );
        self.bursts.push(Burst::spawn(params, motion, rng));
    }

    /// Step every burst and drop the ones that finished. Returns how many were dropped.
    pub fn step_all(&mut self) -> usize {
        for burst in &mut self.bursts {
            burst.step();
        }
        let before = self.bursts.len();
        self.bursts.retain(|burst| !burst.is_finished());
        before - self.bursts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Burst> {
        self.bursts.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Burst> {
        self.bursts.get(index)
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}
