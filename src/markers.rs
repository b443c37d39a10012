//! Timeline marker sprites placed along the curve.

use glam::Vec3;

use crate::config::SceneConfig;
use crate::curve::HeartCurve;
use crate::easing::{EasingFunction, Tween};
use crate::particle::PointVertex;
use crate::timeline::Timeline;

#[derive(Debug, Clone)]
pub struct Marker {
    pub entry_id: usize,
    pub position: Vec3,
    pub scale: f32,
    pulse: Option<Tween>,
}

impl Marker {
    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    rest_scale: f32,
    easing: EasingFunction,
}

impl MarkerSet {
    pub fn new(timeline: &Timeline, curve: &HeartCurve, config: &SceneConfig) -> Self {
        let markers = timeline
            .entries()
            .iter()
            .map(|entry| Marker {
                entry_id: entry.id,
                position: curve.point_at(entry.t),
                scale: config.marker_scale,
                pulse: None,
            })
            .collect();
        Self {
            markers,
            rest_scale: config.marker_scale,
            easing: config.marker_pulse_easing,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, entry_id: usize) -> Option<&Marker> {
        self.markers.iter().find(|m| m.entry_id == entry_id)
    }

    /// Restart the pop animation on one marker, replacing any running pulse.
    pub fn pulse(&mut self, entry_id: usize, from: f32, duration: f32) {
        let rest = self.rest_scale;
        let easing = self.easing;
        if let Some(marker) = self.markers.iter_mut().find(|m| m.entry_id == entry_id) {
            marker.scale = from;
            marker.pulse = Some(Tween::new(from, rest, duration, easing));
        }
    }

    /// Advance running pulses by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for marker in &mut self.markers {
            if let Some(tween) = marker.pulse.as_mut() {
                marker.scale = tween.advance(dt);
                if tween.is_finished() {
                    marker.pulse = None;
                }
            }
        }
    }

    pub fn vertices(&self) -> Vec<PointVertex> {
        self.markers
            .iter()
            .map(|m| PointVertex {
                position: m.position.to_array(),
                size: m.scale,
            })
            .collect()
    }
}
