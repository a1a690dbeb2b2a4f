//! Planar geometry helpers shared by the detection methods.

use contracts::Detection;

use crate::ring::SensorPose;

/// Minimum separation between emitted detections (meters)
pub const MIN_SEPARATION_M: f64 = 0.08;

/// Wrap an angle into (-pi, pi]
pub fn wrap_to_pi(mut angle: f64) -> f64 {
    while angle > std::f64::consts::PI {
        angle -= 2.0 * std::f64::consts::PI;
    }
    while angle < -std::f64::consts::PI {
        angle += 2.0 * std::f64::consts::PI;
    }
    angle
}

/// Intersect two forward rays `p + t*d` (t >= 0).
///
/// Returns `None` for near-parallel rays or an intersection behind either
/// origin.
pub fn ray_intersection(
    p0: (f64, f64),
    d0: (f64, f64),
    p1: (f64, f64),
    d1: (f64, f64),
) -> Option<Detection> {
    let det = d0.0 * d1.1 - d0.1 * d1.0;
    if det.abs() < 1.0e-6 {
        return None;
    }

    let px = p1.0 - p0.0;
    let py = p1.1 - p0.1;
    let t = (px * d1.1 - py * d1.0) / det;
    let u = (px * d0.1 - py * d0.0) / det;
    if t < 0.0 || u < 0.0 {
        return None;
    }

    Some(Detection::new(p0.0 + t * d0.0, p0.1 + t * d0.1))
}

/// Whether a point lies within a sensor's FOV pie out to `range_m`
pub fn point_in_sensor_sector(sensor: &SensorPose, point: &Detection, range_m: f64) -> bool {
    let dx = point.x_m - sensor.x_m;
    let dy = point.y_m - sensor.y_m;
    let r = (dx * dx + dy * dy).sqrt();
    if r > range_m + 1.0e-6 {
        return false;
    }
    let bearing = dy.atan2(dx);
    let delta = wrap_to_pi(bearing - sensor.mounting_rad).abs();
    delta <= 0.5 * sensor.fov_rad + 1.0e-6
}

/// Axis-aligned-in-rotated-frame ellipse model
#[derive(Debug, Clone, Copy)]
pub struct EllipseModel {
    /// Center x (meters)
    pub cx: f64,

    /// Center y (meters)
    pub cy: f64,

    /// Semi-major axis (meters)
    pub axis_a: f64,

    /// Semi-minor axis (meters)
    pub axis_b: f64,

    /// Rotation of the major axis (radians)
    pub theta: f64,
}

impl EllipseModel {
    /// Boundary point at parameter `t`
    pub fn point_at(&self, t: f64) -> Detection {
        let (st, ct) = t.sin_cos();
        let (sp, cp) = self.theta.sin_cos();

        let x_local = self.axis_a * ct;
        let y_local = self.axis_b * st;
        Detection::new(
            self.cx + x_local * cp - y_local * sp,
            self.cy + x_local * sp + y_local * cp,
        )
    }

    /// Signed implicit value: negative inside, zero on the boundary
    pub fn implicit_value(&self, x_m: f64, y_m: f64) -> f64 {
        let dx = x_m - self.cx;
        let dy = y_m - self.cy;
        let (sp, cp) = self.theta.sin_cos();
        let xr = dx * cp + dy * sp;
        let yr = -dx * sp + dy * cp;
        let a_sq = (self.axis_a * self.axis_a).max(1.0e-9);
        let b_sq = (self.axis_b * self.axis_b).max(1.0e-9);
        xr * xr / a_sq + yr * yr / b_sq - 1.0
    }

    /// Distance of the implicit value from the boundary
    pub fn implicit_error(&self, x_m: f64, y_m: f64) -> f64 {
        self.implicit_value(x_m, y_m).abs()
    }
}

/// Push `candidate` unless an emitted point already lies within
/// [`MIN_SEPARATION_M`] of it.
pub fn push_unique(detections: &mut Vec<Detection>, candidate: Detection) {
    let min_sep_sq = MIN_SEPARATION_M * MIN_SEPARATION_M;
    for p in detections.iter() {
        if p.distance_sq(&candidate) <= min_sep_sq {
            return;
        }
    }
    detections.push(candidate);
}

/// Whether any point lies within `radius_m` of `candidate`
pub fn has_support_near(points: &[Detection], candidate: &Detection, radius_m: f64) -> bool {
    let radius_sq = radius_m * radius_m;
    points
        .iter()
        .any(|p| p.distance_sq(candidate) <= radius_sq)
}
