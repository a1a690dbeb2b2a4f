//! FOV-pie detector: center-ray intersection validated by both sensor cones.

use contracts::{Detection, SignalWay};

use crate::detect::tracing::tracing_detection;
use crate::geometry::{point_in_sensor_sector, ray_intersection, EllipseModel};
use crate::ring::SensorRing;

/// Shrink factor applied to the tracing point when center rays give no
/// usable intersection
const SCALED_TRACING_FACTOR: f64 = 0.98;

/// Detection for a signal way from the sensor FOV pies.
///
/// Monostatic: the point at the measured range along the mounting bearing.
/// Bistatic: the intersection of both center rays, accepted only when it
/// lies inside both sensor sectors; otherwise a scaled tracing fallback.
pub fn fov_pie_detection(ring: &SensorRing, sw: &SignalWay) -> Option<Detection> {
    let (s0, s1) = ring.pair_poses(sw.group_id, sw.signal_way_id)?;
    let range_m = f64::from(sw.distance_m);
    if range_m <= 0.0 {
        return None;
    }

    let (tx, rx) = ring.decode_pair(sw.group_id, sw.signal_way_id)?;
    if tx == rx {
        return Some(Detection::new(
            s0.x_m + range_m * s0.mounting_rad.cos(),
            s0.y_m + range_m * s0.mounting_rad.sin(),
        ));
    }

    let candidate = ray_intersection(
        (s0.x_m, s0.y_m),
        (s0.mounting_rad.cos(), s0.mounting_rad.sin()),
        (s1.x_m, s1.y_m),
        (s1.mounting_rad.cos(), s1.mounting_rad.sin()),
    );
    if let Some(hit) = candidate {
        if point_in_sensor_sector(s0, &hit, range_m) && point_in_sensor_sector(s1, &hit, range_m) {
            return Some(hit);
        }
    }

    // Center rays diverge or meet outside the valid sectors.
    let tracing = tracing_detection(ring, sw);
    Some(Detection::new(
        tracing.x_m * SCALED_TRACING_FACTOR,
        tracing.y_m * SCALED_TRACING_FACTOR,
    ))
}

/// Ellipse approximation of a signal way's FOV cone, consumed by the
/// cross-ellipse intersection collector.
///
/// Monostatic cones become isotropic discs of radius `d`; bistatic cones
/// become ellipses around the pair midpoint oriented along the mean
/// mounting bearing.
pub fn fov_cone_model(ring: &SensorRing, sw: &SignalWay) -> Option<EllipseModel> {
    let (s0, s1) = ring.pair_poses(sw.group_id, sw.signal_way_id)?;
    let distance = f64::from(sw.distance_m);
    if distance <= 0.0 {
        return None;
    }

    let cx = 0.5 * (s0.x_m + s1.x_m);
    let cy = 0.5 * (s0.y_m + s1.y_m);

    let (tx, rx) = ring.decode_pair(sw.group_id, sw.signal_way_id)?;
    if tx == rx {
        return Some(EllipseModel {
            cx,
            cy,
            axis_a: distance,
            axis_b: distance,
            theta: s0.mounting_rad,
        });
    }

    let dx = s1.x_m - s0.x_m;
    let dy = s1.y_m - s0.y_m;
    let baseline = (dx * dx + dy * dy).sqrt();
    Some(EllipseModel {
        cx,
        cy,
        axis_a: distance,
        axis_b: (0.25 * distance).max(0.5 * baseline),
        theta: 0.5 * (s0.mounting_rad + s1.mounting_rad),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monostatic_point_on_center_ray() {
        let ring = SensorRing::default();
        let sw = SignalWay {
            timestamp_us: 0,
            distance_m: 1.8,
            group_id: 0,
            signal_way_id: 6,
        };

        let det = fov_pie_detection(&ring, &sw).unwrap();
        let s2 = ring.sensor(2).unwrap();
        assert!((det.x_m - (s2.x_m + 1.8 * s2.mounting_rad.cos())).abs() < 1e-9);
        assert!((det.y_m - (s2.y_m + 1.8 * s2.mounting_rad.sin())).abs() < 1e-9);
    }

    #[test]
    fn test_bistatic_falls_back_when_rays_diverge() {
        let ring = SensorRing::default();
        // Sensors 0 and 1 point 49 degrees apart; at short range the center
        // rays meet far outside both sectors.
        let sw = SignalWay {
            timestamp_us: 0,
            distance_m: 0.5,
            group_id: 0,
            signal_way_id: 1,
        };

        let det = fov_pie_detection(&ring, &sw).unwrap();
        let tracing = tracing_detection(&ring, &sw);
        assert!((det.x_m - tracing.x_m * 0.98).abs() < 1e-9);
        assert!((det.y_m - tracing.y_m * 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_undecodable_or_zero_range_rejected() {
        let ring = SensorRing::default();
        let bad_group = SignalWay {
            timestamp_us: 0,
            distance_m: 1.0,
            group_id: 2,
            signal_way_id: 1,
        };
        assert!(fov_pie_detection(&ring, &bad_group).is_none());

        let zero_range = SignalWay {
            timestamp_us: 0,
            distance_m: 0.0,
            group_id: 0,
            signal_way_id: 1,
        };
        assert!(fov_pie_detection(&ring, &zero_range).is_none());
    }

    #[test]
    fn test_fov_cone_models() {
        let ring = SensorRing::default();

        let mono = SignalWay {
            timestamp_us: 0,
            distance_m: 2.0,
            group_id: 0,
            signal_way_id: 0,
        };
        let disc = fov_cone_model(&ring, &mono).unwrap();
        assert!((disc.axis_a - 2.0).abs() < 1e-9);
        assert!((disc.axis_b - 2.0).abs() < 1e-9);

        let bi = SignalWay {
            timestamp_us: 0,
            distance_m: 2.0,
            group_id: 0,
            signal_way_id: 1,
        };
        let cone = fov_cone_model(&ring, &bi).unwrap();
        let s0 = ring.sensor(0).unwrap();
        let s1 = ring.sensor(1).unwrap();
        let baseline =
            ((s1.x_m - s0.x_m).powi(2) + (s1.y_m - s0.y_m).powi(2)).sqrt();
        assert!((cone.axis_b - (0.25 * 2.0f64).max(0.5 * baseline)).abs() < 1e-9);
        assert!((cone.theta - 0.5 * (s0.mounting_rad + s1.mounting_rad)).abs() < 1e-9);
    }
}
