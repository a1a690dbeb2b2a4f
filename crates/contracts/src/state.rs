//! Vehicle state and pose types shared across crates.

use serde::{Deserialize, Serialize};

/// 2D pose in the vehicle odometry frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    /// Position x (meters)
    pub x_m: f32,

    /// Position y (meters)
    pub y_m: f32,

    /// Heading (radians, not wrapped)
    pub yaw_rad: f32,
}

/// Timestamped ego vehicle state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Timestamp (microseconds)
    pub timestamp_us: u64,

    /// 2D pose
    pub pose: Pose2,

    /// Longitudinal speed (m/s)
    pub v_lon_mps: f32,

    /// Yaw rate (rad/s)
    pub yaw_rate_rps: f32,
}

/// A single obstacle detection, a point in the vehicle body frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// x (meters)
    pub x_m: f64,

    /// y (meters)
    pub y_m: f64,
}

impl Detection {
    /// Create a detection at the given body-frame coordinates
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    /// Squared distance to another detection
    pub fn distance_sq(&self, other: &Detection) -> f64 {
        let dx = self.x_m - other.x_m;
        let dy = self.y_m - other.y_m;
        dx * dx + dy * dy
    }
}
