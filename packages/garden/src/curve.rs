//! Centripetal Catmull-Rom spline through a list of control points.
//!
//! Used for the valley river: the tube mesh is swept along it and the dog
//! walks beside it.

use glam::Vec3;

/// Open centripetal Catmull-Rom curve.
///
/// `point(0.0)` is the first control point and `point(1.0)` the last; end
/// segments use mirrored phantom points.
#[derive(Debug, Clone)]
pub struct CatmullRom {
    points: Vec<Vec3>,
}

impl CatmullRom {
    /// Create a curve. Returns `None` with fewer than two control points.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { points })
    }

    /// Position at parameter `t` in `[0, 1]` (clamped).
    pub fn point(&self, t: f32) -> Vec3 {
        let pts = &self.points;
        let l = pts.len();
        let p = (l - 1) as f32 * t.clamp(0.0, 1.0);
        let mut int_point = p.floor() as usize;
        let mut weight = p - int_point as f32;

        if int_point >= l - 1 {
            int_point = l - 2;
            weight = 1.0;
        }

        let p0 = if int_point > 0 {
            pts[int_point - 1]
        } else {
            pts[0] + (pts[0] - pts[1])
        };
        let p1 = pts[int_point];
        let p2 = pts[int_point + 1];
        let p3 = if int_point + 2 < l {
            pts[int_point + 2]
        } else {
            pts[l - 1] + (pts[l - 1] - pts[l - 2])
        };

        // Centripetal parameterisation: knot spacing = distance^0.5
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        Vec3::new(
            nonuniform_segment(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2, weight),
            nonuniform_segment(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2, weight),
            nonuniform_segment(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2, weight),
        )
    }

    /// Unit tangent at `t`, estimated by a central difference.
    pub fn tangent(&self, t: f32) -> Vec3 {
        const DELTA: f32 = 0.0001;
        let t1 = (t - DELTA).max(0.0);
        let t2 = (t + DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    /// `count + 1` evenly spaced samples from `t = 0` to `t = 1`.
    pub fn sample(&self, count: usize) -> Vec<Vec3> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.point(i as f32 / count as f32))
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn nonuniform_segment(x0: f32, x1: f32, x2: f32, x3: f32, dt0: f32, dt1: f32, dt2: f32, t: f32) -> f32 {
    let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
    let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;

    // Cubic Hermite from x1 to x2 with tangents t1, t2
    let c0 = x1;
    let c1 = t1;
    let c2 = -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2;
    let c3 = 2.0 * x1 - 2.0 * x2 + t1 + t2;
    c0 + c1 * t + c2 * t * t + c3 * t * t * t
}
