//! The heart-shaped camera path.
//!
//! Control points come from the classic parametric heart, stretched along Z so
//! the camera flies through it. Between control points the path is a
//! centripetal Catmull-Rom spline; `point_at` re-parametrises it by arc length
//! so scroll progress maps to distance travelled.

use glam::Vec3;

/// Sub-divisions of the arc-length lookup table.
const ARC_LENGTH_DIVISIONS: usize = 200;

const PARAM_START: f32 = -0.1;
const PARAM_STEP: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct HeartCurve {
    points: Vec<Vec3>,
    /// Cumulative length at each of the `ARC_LENGTH_DIVISIONS + 1` raw samples.
    arc_lengths: Vec<f32>,
}

impl HeartCurve {
    pub fn new(scale: f32) -> Self {
        Self::from_points(heart_points(scale))
    }

    /// Build a spline through arbitrary control points.
    ///
    /// Fewer than two points yields a degenerate curve pinned to the single
    /// point (or the origin).
    pub fn from_points(points: Vec<Vec3>) -> Self {
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths();
        curve
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total (approximate) length of the path.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at arc-length parameter `u ∈ [0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Look-ahead point used as the camera's aim while travelling.
    pub fn tangent_target(&self, u: f32, look_ahead: f32) -> Vec3 {
        self.point_at((u + look_ahead).min(1.0))
    }

    /// Point at raw spline parameter `t ∈ [0, 1]`.
    pub fn point(&self, t: f32) -> Vec3 {
        let l = self.points.len();
        match l {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let p = (l - 1) as f32 * t;
        let mut index = p.floor() as usize;
        let mut weight = p - index as f32;
        if index >= l - 1 {
            index = l - 2;
            weight = 1.0;
        }

        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        let p0 = if index > 0 {
            self.points[index - 1]
        } else {
            p1 + (p1 - p2)
        };
        let p3 = if index + 2 < l {
            self.points[index + 2]
        } else {
            p2 + (p2 - p1)
        };

        centripetal_segment(p0, p1, p2, p3, weight)
    }

    /// `divisions + 1` points evenly spaced in raw spline parameter.
    pub fn sample(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|d| self.point(d as f32 / divisions as f32))
            .collect()
    }

    fn compute_arc_lengths(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for d in 1..=ARC_LENGTH_DIVISIONS {
            let current = self.point(d as f32 / ARC_LENGTH_DIVISIONS as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Map an arc-length fraction to the raw spline parameter.
    fn u_to_t(&self, u: f32) -> f32 {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let n = self.arc_lengths.len();
        let total = self.length();
        if n < 2 || total <= 0.0 {
            return u;
        }

        let target = u * total;
        let i = self.arc_lengths.partition_point(|&len| len < target);
        if i == 0 {
            return 0.0;
        }
        if i >= n {
            return 1.0;
        }
        if self.arc_lengths[i] == target {
            return i as f32 / (n - 1) as f32;
        }

        let before = self.arc_lengths[i - 1];
        let segment = self.arc_lengths[i] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        ((i - 1) as f32 + fraction) / (n - 1) as f32
    }
}

/// Control points of the heart, `x = 16 sin³ i`, `y = 13 cos i - 5 cos 2i - 2 cos 3i - cos 4i`.
pub fn heart_points(scale: f32) -> Vec<Vec3> {
    let end = std::f32::consts::TAU + 0.1;
    let mut points = Vec::new();
    let mut k = 0u32;
    loop {
        let i = PARAM_START + k as f32 * PARAM_STEP;
        if i > end {
            break;
        }
        let x = 16.0 * i.sin().powi(3);
        let y = 13.0 * i.cos() - 5.0 * (2.0 * i).cos() - 2.0 * (3.0 * i).cos() - (4.0 * i).cos();
        let z = i * 2.5 - 5.0;
        points.push(Vec3::new(x * scale * 0.1, y * scale * 0.1, -z * 3.0));
        k += 1;
    }
    points
}

fn centripetal_segment(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, w: f32) -> Vec3 {
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);

    // Safety against repeated points.
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let c0 = p1;
    let c1 = t1;
    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
    let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;

    let w2 = w * w;
    c0 + c1 * w + c2 * w2 + c3 * (w2 * w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3, eps: f32) -> bool {
        a.distance(b) < eps
    }

    #[test]
    fn test_heart_point_count() {
        // -0.1 ..= 2π + 0.1 in steps of 0.05
        assert_eq!(heart_points(18.0).len(), 130);
    }

    #[test]
    fn test_curve_endpoints_match_control_points() {
        let curve = HeartCurve::new(18.0);
        let pts = curve.control_points();
        assert!(approx(curve.point_at(0.0), pts[0], 1e-4));
        assert!(approx(curve.point_at(1.0), *pts.last().unwrap(), 1e-3));
    }

    #[test]
    fn test_spline_interpolates_control_points() {
        let curve = HeartCurve::new(18.0);
        let pts = curve.control_points();
        let n = pts.len();
        for k in [1usize, 17, 64, 100] {
            let t = k as f32 / (n - 1) as f32;
            assert!(approx(curve.point(t), pts[k], 1e-2), "control point {}", k);
        }
    }

    #[test]
    fn test_point_at_is_arc_length_uniform() {
        let curve = HeartCurve::new(18.0);
        let steps = 10;
        let expected = curve.length() / steps as f32;
        for s in 0..steps {
            let a = curve.point_at(s as f32 / steps as f32);
            let b = curve.point_at((s + 1) as f32 / steps as f32);
            let chord = a.distance(b);
            // Chords are never longer than the arc and not much shorter on this path.
            assert!(chord <= expected * 1.02, "segment {} chord {} > {}", s, chord, expected);
            assert!(chord > expected * 0.5, "segment {} chord {} << {}", s, chord, expected);
        }
    }

    #[test]
    fn test_tangent_target_clamps_at_end() {
        let curve = HeartCurve::new(18.0);
        assert!(approx(curve.tangent_target(0.99, 0.02), curve.point_at(1.0), 1e-5));
        assert!(approx(curve.tangent_target(0.5, 0.02), curve.point_at(0.52), 1e-5));
    }

    #[test]
    fn test_sample_count() {
        let curve = HeartCurve::new(18.0);
        assert_eq!(curve.sample(1000).len(), 1001);
    }

    #[test]
    fn test_out_of_range_parameter_is_clamped() {
        let curve = HeartCurve::new(18.0);
        assert!(approx(curve.point_at(-1.0), curve.point_at(0.0), 1e-6));
        assert!(approx(curve.point_at(2.0), curve.point_at(1.0), 1e-6));
        assert!(approx(curve.point_at(f32::NAN), curve.point_at(0.0), 1e-6));
    }

    #[test]
    fn test_straight_line_is_linear() {
        let curve = HeartCurve::from_points(vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ]);
        assert!(approx(curve.point_at(0.5), Vec3::new(1.0, 0.0, 0.0), 1e-3));
        assert!((curve.length() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_curves() {
        let empty = HeartCurve::from_points(Vec::new());
        assert_eq!(empty.point_at(0.5), Vec3::ZERO);
        let single = HeartCurve::from_points(vec![Vec3::ONE]);
        assert_eq!(single.point_at(0.3), Vec3::ONE);
    }
}
