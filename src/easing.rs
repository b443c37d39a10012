//! Easing curves and one-shot scalar tweens.

use serde::{Deserialize, Serialize};

/// Easing function for tween transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in (slow start).
    QuadraticIn,
    /// Quadratic ease-out (slow end).
    #[default]
    QuadraticOut,
    /// Quadratic ease-in-out (slow start and end).
    QuadraticInOut,
    /// Cubic ease-out.
    CubicOut,
    /// Exponential ease-out.
    ExponentialOut,
    /// Smooth step (Hermite interpolation).
    SmoothStep,
}

impl EasingFunction {
    /// Apply the easing to a normalized time `t`, clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => t * (2.0 - t),
            EasingFunction::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            EasingFunction::CubicOut => {
                let t1 = t - 1.0;
                t1 * t1 * t1 + 1.0
            }
            EasingFunction::ExponentialOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (2.0_f32).powf(-10.0 * t)
                }
            }
            EasingFunction::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A scalar animation from `from` to `to` over `duration` seconds.
///
/// Advanced explicitly by the caller; it never reads a clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub easing: EasingFunction,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn value(&self) -> f32 {
        let eased = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_fixed() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::QuadraticIn,
            EasingFunction::QuadraticOut,
            EasingFunction::QuadraticInOut,
            EasingFunction::CubicOut,
            EasingFunction::ExponentialOut,
            EasingFunction::SmoothStep,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{:?}", easing);
        }
    }

    #[test]
    fn test_quadratic_out_is_ahead_of_linear() {
        let v = EasingFunction::QuadraticOut.apply(0.5);
        assert!((v - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_apply_smoothstep() {
        let v = EasingFunction::SmoothStep.apply(0.5);
        assert!((v - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_tween_runs_from_to() {
        let mut tween = Tween::new(3.0, 1.5, 1.0, EasingFunction::QuadraticOut);
        assert_eq!(tween.value(), 3.0);
        let mid = tween.advance(0.5);
        assert!(mid < 3.0 && mid > 1.5);
        assert!(!tween.is_finished());
        let end = tween.advance(0.75);
        assert!((end - 1.5).abs() < 1e-6);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_tween_is_finished() {
        let tween = Tween::new(0.0, 1.0, 0.0, EasingFunction::Linear);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 1.0);
    }
}
