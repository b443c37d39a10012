//! Scroll-driven camera rig.
//!
//! The camera has two regimes keyed solely on progress:
//! - **Traveling** (`progress < arrival_threshold`): follows the heart curve,
//!   aims at a look-ahead point and rolls with progress.
//! - **Arriving** (`progress >= arrival_threshold`): settles slowly on a fixed
//!   terminal point, aimed at the origin.
//!
//! There is no hysteresis band; scrolling back below the threshold returns to
//! `Traveling` on the next update.

use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::config::SceneConfig;
use crate::curve::HeartCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraRegime {
    Traveling,
    Arriving,
}

impl CameraRegime {
    /// Transition guard: the regime for a given progress.
    pub fn for_progress(progress: f32, threshold: f32) -> Self {
        if progress < threshold {
            CameraRegime::Traveling
        } else {
            CameraRegime::Arriving
        }
    }
}

/// Evaluated camera state for one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Roll about the viewing axis, in radians.
    pub roll: f32,
    pub regime: CameraRegime,
}

impl CameraPose {
    /// View matrix: look-at, then roll about the view axis.
    pub fn view_matrix(&self) -> Mat4 {
        let look = Mat4::look_at_rh(self.position, self.look_at, Vec3::Y);
        Mat4::from_rotation_z(-self.roll) * look
    }
}

/// The camera's persistent state between updates.
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    regime: CameraRegime,
}

impl CameraRig {
    pub fn new(start: Vec3) -> Self {
        Self {
            position: start,
            regime: CameraRegime::Traveling,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn regime(&self) -> CameraRegime {
        self.regime
    }

    /// Ease towards this update's target and return the resulting pose.
    pub fn update(&mut self, curve: &HeartCurve, config: &SceneConfig, progress: f32, time: f32) -> CameraPose {
        let regime = CameraRegime::for_progress(progress, config.arrival_threshold);
        if regime != self.regime {
            log::debug!("Camera regime {:?} -> {:?} at progress {:.4}", self.regime, regime, progress);
            self.regime = regime;
        }

        let (target, smoothing, look_at, roll) = match regime {
            CameraRegime::Traveling => {
                let sway = Vec3::new(
                    (time * 0.3).sin() * config.sway_amplitude,
                    (time * 0.2).cos() * config.sway_amplitude,
                    0.0,
                );
                (
                    curve.point_at(progress) + sway,
                    config.travel_smoothing,
                    curve.tangent_target(progress, config.look_ahead),
                    progress * config.roll_factor,
                )
            }
            CameraRegime::Arriving => (
                config.terminal_point,
                config.arrival_smoothing,
                Vec3::ZERO,
                0.0,
            ),
        };

        self.position += (target - self.position) * smoothing;

        CameraPose {
            position: self.position,
            look_at,
            roll,
            regime,
        }
    }
}
