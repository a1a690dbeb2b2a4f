//! Processor configuration contracts shared across crates.

use serde::{Deserialize, Serialize};

/// Signal-way group filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFilter {
    /// Front group only (group_id == 0)
    Front,
    /// Rear group only (group_id == 1)
    Rear,
    /// Both groups
    #[default]
    Surround,
}

impl GroupFilter {
    /// Whether a signal way with the given group id passes this filter
    pub fn matches(&self, group_id: u8) -> bool {
        if group_id > 1 {
            return false;
        }
        match self {
            Self::Front => group_id == 0,
            Self::Rear => group_id == 1,
            Self::Surround => true,
        }
    }
}

/// Geometric reconstruction method selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Bisector tracing only
    SignalTracing,
    /// FOV-pie intersection only
    FovIntersection,
    /// Ellipse intersection only
    EllipseIntersection,
    /// All three methods plus fusion
    #[default]
    All,
}

impl ProcessingMethod {
    /// Whether the tracing detector runs under this selection
    pub fn runs_tracing(&self) -> bool {
        matches!(self, Self::SignalTracing | Self::All)
    }

    /// Whether the FOV-pie detector runs under this selection
    pub fn runs_fov(&self) -> bool {
        matches!(self, Self::FovIntersection | Self::All)
    }

    /// Whether the ellipse detector runs under this selection
    pub fn runs_ellipse(&self) -> bool {
        matches!(self, Self::EllipseIntersection | Self::All)
    }
}

/// Processor configuration
///
/// `n_sigma_valeo` and `use_legacy_valeo_bugfix` are accepted and validated
/// for configuration compatibility but not consumed by the detectors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Reserved conversion parameter
    pub n_sigma_valeo: f32,

    /// Reserved conversion toggle
    pub use_legacy_valeo_bugfix: bool,

    /// Group filter applied before detection
    pub group_filter: GroupFilter,

    /// Active reconstruction method(s)
    pub processing_method: ProcessingMethod,

    /// Lower range bound (exclusive, meters)
    pub min_range_m: f32,

    /// Upper range bound (inclusive, meters)
    pub max_range_m: f32,

    /// Connectivity radius for the cluster reducer (meters)
    pub cluster_radius_m: f32,

    /// Reject frames whose timestamp does not strictly increase
    pub strict_monotonic_timestamps: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            n_sigma_valeo: 3.0,
            use_legacy_valeo_bugfix: false,
            group_filter: GroupFilter::Surround,
            processing_method: ProcessingMethod::All,
            min_range_m: 0.00001,
            max_range_m: 5.5,
            cluster_radius_m: 0.35,
            strict_monotonic_timestamps: true,
        }
    }
}
