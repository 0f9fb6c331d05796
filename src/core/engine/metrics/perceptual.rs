//! Perceptually uniform distance in CIE L*a*b*.
//!
//! Both pixels are converted from sRGB to Lab and compared by Euclidean
//! distance (Delta E 1976). Lab distances are not bounded by 255, so the
//! tolerance is used as a raw Delta E without scaling.

use super::super::lab::{srgb8_to_lab, Lab};
use super::super::traits::{DistanceMetric, DistanceMetricKind};
use crate::core::config::Tolerance;
use crate::core::grid::ColorMode;

/// Delta E 1976 between sRGB pixels
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptualDistance;

impl PerceptualDistance {
    pub fn new() -> Self {
        Self
    }
}

fn to_lab(pixel: &[u8], mode: ColorMode) -> Lab {
    match mode {
        // Grayscale samples are treated as neutral sRGB triples.
        ColorMode::Grayscale => srgb8_to_lab(pixel[0], pixel[0], pixel[0]),
        ColorMode::Rgb => srgb8_to_lab(pixel[0], pixel[1], pixel[2]),
    }
}

impl DistanceMetric for PerceptualDistance {
    fn distance(&self, a: &[u8], b: &[u8], mode: ColorMode) -> f64 {
        if a == b {
            return 0.0;
        }
        to_lab(a, mode).delta_e(&to_lab(b, mode))
    }

    fn threshold(&self, tolerance: Tolerance) -> f64 {
        tolerance.percent()
    }

    fn kind(&self) -> DistanceMetricKind {
        DistanceMetricKind::Perceptual
    }
}
