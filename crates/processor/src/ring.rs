//! Sensor ring model: transducer poses, signal-way pair decoding, contour test.

use contracts::SensorCalibration;

/// Number of transducers in the ring
pub const RING_SENSOR_COUNT: usize = 12;

/// Signal-way id -> (tx, rx) sensor offsets within a group.
///
/// Ids walk near-neighbour pairs along the ring: monostatic self-echoes
/// interleaved with both orderings of each adjacent bistatic pair.
const SIGNAL_WAY_PAIRS: [(usize, usize); 16] = [
    (0, 0),
    (0, 1),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, 1),
    (2, 2),
    (2, 3),
    (3, 2),
    (3, 3),
    (3, 4),
    (4, 3),
    (4, 4),
    (4, 5),
    (5, 4),
    (5, 5),
];

/// Pose of a single transducer in the vehicle body frame
#[derive(Debug, Clone, Copy)]
pub struct SensorPose {
    /// Position x (meters)
    pub x_m: f64,

    /// Position y (meters)
    pub y_m: f64,

    /// Mounting bearing (radians)
    pub mounting_rad: f64,

    /// Full angular field of view (radians)
    pub fov_rad: f64,
}

impl SensorPose {
    fn from_degrees(x_m: f64, y_m: f64, mounting_deg: f64, fov_deg: f64) -> Self {
        Self {
            x_m,
            y_m,
            mounting_rad: mounting_deg.to_radians(),
            fov_rad: fov_deg.to_radians(),
        }
    }
}

/// Static ring of twelve transducer poses.
///
/// Indices 0..5 form the front group, 6..11 the rear group. The vehicle
/// contour polygon is the closed loop of the twelve sensor positions.
#[derive(Debug, Clone)]
pub struct SensorRing {
    poses: [SensorPose; RING_SENSOR_COUNT],
    contour: [(f64, f64); RING_SENSOR_COUNT],
}

impl Default for SensorRing {
    fn default() -> Self {
        Self::from_poses([
            SensorPose::from_degrees(3.238, 0.913, 87.0, 60.0),
            SensorPose::from_degrees(3.6, 0.715, 38.0, 100.0),
            SensorPose::from_degrees(3.804, 0.276, 7.0, 100.0),
            SensorPose::from_degrees(3.804, -0.276, -4.0, 75.0),
            SensorPose::from_degrees(3.6, -0.715, -28.0, 75.0),
            SensorPose::from_degrees(3.238, -0.913, -87.0, 45.0),
            SensorPose::from_degrees(-0.775, -0.822, -100.0, 75.0),
            SensorPose::from_degrees(-0.956, -0.71, -165.0, 75.0),
            SensorPose::from_degrees(-1.09, -0.25, -175.0, 75.0),
            SensorPose::from_degrees(-1.09, 0.25, 173.0, 100.0),
            SensorPose::from_degrees(-0.956, 0.71, 151.0, 100.0),
            SensorPose::from_degrees(-0.775, 0.822, 99.0, 100.0),
        ])
    }
}

impl SensorRing {
    /// Build a ring from explicit poses
    pub fn from_poses(poses: [SensorPose; RING_SENSOR_COUNT]) -> Self {
        // Rear sensors first (11..6), then front (5..0), so the positions
        // trace one closed loop around the vehicle.
        let mut contour = [(0.0, 0.0); RING_SENSOR_COUNT];
        for (slot, idx) in (0..RING_SENSOR_COUNT).rev().enumerate() {
            contour[slot] = (poses[idx].x_m, poses[idx].y_m);
        }
        Self { poses, contour }
    }

    /// Build a ring from vehicle-geometry calibrations (degrees in, radians out).
    ///
    /// Returns `None` unless exactly twelve sensors are calibrated.
    pub fn from_calibrations(sensors: &[SensorCalibration]) -> Option<Self> {
        if sensors.len() != RING_SENSOR_COUNT {
            return None;
        }
        let mut poses = [SensorPose::from_degrees(0.0, 0.0, 0.0, 100.0); RING_SENSOR_COUNT];
        for (pose, cal) in poses.iter_mut().zip(sensors) {
            *pose = SensorPose::from_degrees(
                f64::from(cal.x_m),
                f64::from(cal.y_m),
                f64::from(cal.mounting_deg),
                f64::from(cal.fov_deg),
            );
        }
        Some(Self::from_poses(poses))
    }

    /// Pose of the sensor at the given ring index
    pub fn sensor(&self, index: usize) -> Option<&SensorPose> {
        self.poses.get(index)
    }

    /// All twelve poses in ring index order
    pub fn poses(&self) -> &[SensorPose; RING_SENSOR_COUNT] {
        &self.poses
    }

    /// Contour polygon vertices in loop order
    pub fn contour(&self) -> &[(f64, f64); RING_SENSOR_COUNT] {
        &self.contour
    }

    /// Decode a (group, signal-way) pair into absolute TX/RX sensor indices.
    ///
    /// Fails for `group_id > 1` or `signal_way_id > 15`.
    pub fn decode_pair(&self, group_id: u8, signal_way_id: u8) -> Option<(usize, usize)> {
        if group_id > 1 || signal_way_id > 15 {
            return None;
        }
        let base = if group_id == 1 { 6 } else { 0 };
        let (tx_off, rx_off) = SIGNAL_WAY_PAIRS[usize::from(signal_way_id)];
        Some((base + tx_off, base + rx_off))
    }

    /// TX/RX poses for a decodable signal way
    pub fn pair_poses(
        &self,
        group_id: u8,
        signal_way_id: u8,
    ) -> Option<(&SensorPose, &SensorPose)> {
        let (tx, rx) = self.decode_pair(group_id, signal_way_id)?;
        Some((&self.poses[tx], &self.poses[rx]))
    }

    /// Ray-casting point-in-polygon test against the vehicle contour
    pub fn is_inside_contour(&self, x_m: f64, y_m: f64) -> bool {
        let mut inside = false;
        let n = self.contour.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.contour[i];
            let (xj, yj) = self.contour[j];
            let crosses = (yi > y_m) != (yj > y_m)
                && x_m < (xj - xi) * (y_m - yi) / ((yj - yi) + f64::EPSILON) + xi;
            if crosses {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}
