//! Trait definitions for per-pixel distance metrics.

use crate::core::config::Tolerance;
use crate::core::grid::ColorMode;
use serde::{Deserialize, Serialize};

/// Available distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceMetricKind {
    /// Absolute difference per channel, worst channel wins
    #[default]
    Channel,
    /// Euclidean distance in CIE L*a*b* (Delta E 1976)
    Perceptual,
}

impl DistanceMetricKind {
    /// Get a human-readable description of the metric
    pub fn description(&self) -> &'static str {
        match self {
            DistanceMetricKind::Channel => {
                "Channel distance - a pixel differs if any channel moves more than tolerance% of 255"
            }
            DistanceMetricKind::Perceptual => {
                "Perceptual distance - a pixel differs if its Lab Delta E exceeds the tolerance"
            }
        }
    }
}

impl std::fmt::Display for DistanceMetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetricKind::Channel => write!(f, "channel"),
            DistanceMetricKind::Perceptual => write!(f, "lab"),
        }
    }
}

/// A scalar distance between two pixels of the same color mode
pub trait DistanceMetric: Send + Sync {
    /// Distance between two pixels.
    ///
    /// Both slices hold the samples of one pixel in `mode`.
    fn distance(&self, a: &[u8], b: &[u8], mode: ColorMode) -> f64;

    /// Absolute threshold a distance must exceed to count as a difference
    fn threshold(&self, tolerance: Tolerance) -> f64;

    /// Get the metric kind
    fn kind(&self) -> DistanceMetricKind;
}
