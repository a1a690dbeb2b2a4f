//! Signal-tracing detector: one detection on the bisector of the TX/RX pair.

use contracts::{Detection, SignalWay};

use crate::ring::SensorRing;

/// Trace a signal way to a single detection.
///
/// The detection sits at the measured range from the sensor-pair midpoint,
/// along the direction that averages the two mounting bearings. An
/// undecodable pair degenerates to `(distance, +/-1)` by group; fusion's
/// support radius keeps that escape hatch out of real output.
pub fn tracing_detection(ring: &SensorRing, sw: &SignalWay) -> Detection {
    let distance = f64::from(sw.distance_m);

    let Some((s0, s1)) = ring.pair_poses(sw.group_id, sw.signal_way_id) else {
        let side = if sw.group_id == 0 { 1.0 } else { -1.0 };
        return Detection::new(distance, side);
    };

    let vx0 = s0.mounting_rad.cos() * distance;
    let vy0 = s0.mounting_rad.sin() * distance;
    let vx1 = s1.mounting_rad.cos() * distance;
    let vy1 = s1.mounting_rad.sin() * distance;

    let mut vx = vx0 + vx1;
    let mut vy = vy0 + vy1;
    let norm = (vx * vx + vy * vy).sqrt();
    if norm > 1.0e-9 {
        vx = distance * (vx / norm);
        vy = distance * (vy / norm);
    }

    let cx = 0.5 * (s0.x_m + s1.x_m);
    let cy = 0.5 * (s0.y_m + s1.y_m);
    Detection::new(cx + vx, cy + vy)
}
