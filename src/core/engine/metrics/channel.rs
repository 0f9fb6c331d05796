//! Direct channel-space distance.
//!
//! The distance of a pixel pair is the largest absolute difference over its
//! channels, so "distance > threshold" is exactly "any channel exceeds the
//! threshold". Tolerance is scaled against the 8-bit range.

use super::super::traits::{DistanceMetric, DistanceMetricKind};
use crate::core::config::Tolerance;
use crate::core::grid::ColorMode;

/// Largest representable per-channel difference
pub const MAX_CHANNEL_DISTANCE: f64 = 255.0;

/// Worst-channel absolute difference
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDistance;

impl ChannelDistance {
    pub fn new() -> Self {
        Self
    }
}

impl DistanceMetric for ChannelDistance {
    fn distance(&self, a: &[u8], b: &[u8], _mode: ColorMode) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| x.abs_diff(y))
            .max()
            .unwrap_or(0) as f64
    }

    fn threshold(&self, tolerance: Tolerance) -> f64 {
        tolerance.percent() / 100.0 * MAX_CHANNEL_DISTANCE
    }

    fn kind(&self) -> DistanceMetricKind {
        DistanceMetricKind::Channel
    }
}
