//! Vehicle geometry calibration structures (contour + sensor ring).

use serde::{Deserialize, Serialize};

/// One vertex of the vehicle contour polygon
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    /// x (meters)
    pub x_m: f32,

    /// y (meters)
    pub y_m: f32,
}

/// Mounting calibration of a single ultrasonic transducer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Position x in the body frame (meters)
    pub x_m: f32,

    /// Position y in the body frame (meters)
    pub y_m: f32,

    /// Mounting bearing (degrees)
    pub mounting_deg: f32,

    /// Full angular field of view (degrees)
    pub fov_deg: f32,
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self {
            x_m: 0.0,
            y_m: 0.0,
            mounting_deg: 0.0,
            fov_deg: 100.0,
        }
    }
}

/// Vehicle geometry loaded from a calibration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleGeometry {
    /// Contour polygon vertices, in ring order
    pub contour: Vec<ContourPoint>,

    /// Sensor calibrations, indexed by sensor id
    pub sensors: Vec<SensorCalibration>,
}
