//! # Engine Module
//!
//! Computes where two pixel grids differ.
//!
//! ## How It Works
//! 1. Gate the pair through the compatibility checker
//! 2. Compute a per-pixel distance with the configured metric
//! 3. Convert the tolerance percentage to an absolute threshold, once
//! 4. Mark pixels whose distance is strictly greater than the threshold
//!
//! ## Metrics
//! | Metric       | Distance                     | Threshold             |
//! |--------------|------------------------------|-----------------------|
//! | `Channel`    | max per-channel `abs(a - b)` | `tolerance / 100 * 255` |
//! | `Perceptual` | Lab Delta E 1976             | `tolerance` (raw)     |
//!
//! `total_pixels` is always `width * height`, whatever the metric or the
//! number of channels.
//!
//! ## Parallelism
//! Rows are independent, so the distance pass runs on rayon when enabled.
//!
//! ## Example
//! ```rust,ignore
//! use pixel_diff::core::config::Tolerance;
//! use pixel_diff::core::engine::{CompareConfig, DistanceMetricKind};
//!
//! let engine = CompareConfig::new()
//!     .metric(DistanceMetricKind::Perceptual)
//!     .tolerance(Tolerance::new(2.0)?)
//!     .build();
//!
//! let comparison = engine.compare(&left, &right)?;
//! ```

mod field;
pub mod lab;
mod metrics;
mod traits;

pub use field::{DifferenceField, DifferenceMask};
pub use metrics::{ChannelDistance, PerceptualDistance, MAX_CHANNEL_DISTANCE};
pub use traits::{DistanceMetric, DistanceMetricKind};

use crate::core::checker::check_compatible;
use crate::core::config::Tolerance;
use crate::core::grid::{ColorMode, PixelGrid};
use crate::core::reconstructor::{BlendPolicy, Reconstructor};
use crate::error::CompatibilityError;
use rayon::prelude::*;
use tracing::debug;

/// Configuration builder for the difference engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareConfig {
    /// Distance metric
    metric: DistanceMetricKind,
    /// Tolerance percentage
    tolerance: Tolerance,
    /// How the combined difference image merges both sources
    blend: BlendPolicy,
    /// Spread the distance pass over the rayon pool
    parallel: bool,
}

impl CompareConfig {
    /// Create a configuration with defaults (channel metric, zero tolerance, sum blend)
    pub fn new() -> Self {
        Self {
            metric: DistanceMetricKind::Channel,
            tolerance: Tolerance::ZERO,
            blend: BlendPolicy::Sum,
            parallel: true,
        }
    }

    pub fn metric(mut self, metric: DistanceMetricKind) -> Self {
        self.metric = metric;
        self
    }

    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn blend(mut self, blend: BlendPolicy) -> Self {
        self.blend = blend;
        self
    }

    /// Enable or disable row-parallel computation.
    ///
    /// Results are identical either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the engine
    pub fn build(self) -> DifferenceEngine {
        DifferenceEngine::new(self)
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of comparing two grids
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// `true` where the pixel differs
    pub mask: DifferenceMask,
    /// Number of `true` entries in the mask
    pub differing_pixels: u64,
    /// Width x height
    pub total_pixels: u64,
    /// Absolute threshold the tolerance resolved to
    pub threshold: f64,
    /// Metric that produced the distances
    pub metric: DistanceMetricKind,
    /// Largest per-pixel distance observed
    pub max_distance: f64,
    /// Mean per-pixel distance
    pub mean_distance: f64,
}

impl Comparison {
    /// True when no pixel exceeds the tolerance
    pub fn is_identical(&self) -> bool {
        self.differing_pixels == 0
    }

    /// Share of differing pixels in percent
    pub fn difference_percentage(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.differing_pixels as f64 / self.total_pixels as f64 * 100.0
    }
}

/// Stateless difference engine; safe to share across threads
pub struct DifferenceEngine {
    config: CompareConfig,
    metric: Box<dyn DistanceMetric>,
}

impl DifferenceEngine {
    pub fn new(config: CompareConfig) -> Self {
        let metric: Box<dyn DistanceMetric> = match config.metric {
            DistanceMetricKind::Channel => Box::new(ChannelDistance::new()),
            DistanceMetricKind::Perceptual => Box::new(PerceptualDistance::new()),
        };
        Self { config, metric }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn metric_kind(&self) -> DistanceMetricKind {
        self.metric.kind()
    }

    pub fn tolerance(&self) -> Tolerance {
        self.config.tolerance
    }

    /// Reconstructor using the configured blend policy
    pub fn reconstructor(&self) -> Reconstructor {
        Reconstructor::new(self.config.blend)
    }

    /// Absolute threshold for the configured tolerance
    pub fn threshold(&self) -> f64 {
        self.metric.threshold(self.config.tolerance)
    }

    /// Per-pixel distances between two compatible grids
    pub fn field(
        &self,
        left: &PixelGrid,
        right: &PixelGrid,
    ) -> Result<DifferenceField, CompatibilityError> {
        check_compatible(left, right)?;

        let mode = left.mode();
        let width = left.width() as usize;
        let row_len = left.row_len();
        let mut values = vec![0.0; left.pixel_count() as usize];

        if self.config.parallel {
            values
                .par_chunks_mut(width)
                .zip(left.samples().par_chunks(row_len))
                .zip(right.samples().par_chunks(row_len))
                .for_each(|((out, row_a), row_b)| self.fill_row(out, row_a, row_b, mode));
        } else {
            values
                .chunks_mut(width)
                .zip(left.samples().chunks(row_len))
                .zip(right.samples().chunks(row_len))
                .for_each(|((out, row_a), row_b)| self.fill_row(out, row_a, row_b, mode));
        }

        Ok(DifferenceField::from_parts(left.width(), left.height(), values))
    }

    /// Compare two grids and threshold the result into a mask
    pub fn compare(
        &self,
        left: &PixelGrid,
        right: &PixelGrid,
    ) -> Result<Comparison, CompatibilityError> {
        let field = self.field(left, right)?;
        let threshold = self.threshold();
        let mask = field.threshold(threshold);
        let differing_pixels = mask.count();

        debug!(
            metric = %self.metric_kind(),
            threshold,
            differing_pixels,
            total_pixels = left.pixel_count(),
            "compared grids"
        );

        Ok(Comparison {
            differing_pixels,
            total_pixels: left.pixel_count(),
            threshold,
            metric: self.metric_kind(),
            max_distance: field.max(),
            mean_distance: field.mean(),
            mask,
        })
    }

    fn fill_row(&self, out: &mut [f64], row_a: &[u8], row_b: &[u8], mode: ColorMode) {
        let channels = mode.channel_count();
        for ((slot, a), b) in out
            .iter_mut()
            .zip(row_a.chunks_exact(channels))
            .zip(row_b.chunks_exact(channels))
        {
            *slot = self.metric.distance(a, b, mode);
        }
    }
}

impl std::fmt::Debug for DifferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifferenceEngine")
            .field("config", &self.config)
            .finish()
    }
}

/// Compare two grids in one call
pub fn compare(
    left: &PixelGrid,
    right: &PixelGrid,
    tolerance: Tolerance,
    metric: DistanceMetricKind,
) -> Result<Comparison, CompatibilityError> {
    CompareConfig::new()
        .metric(metric)
        .tolerance(tolerance)
        .build()
        .compare(left, right)
}
