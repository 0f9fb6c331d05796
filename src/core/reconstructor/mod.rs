//! # Reconstructor Module
//!
//! Rebuilds images from a difference mask.
//!
//! ## Outputs
//! - **isolate A**: pixels of the first image where the mask is set, black elsewhere
//! - **isolate B**: the same for the second image
//! - **combined**: both images blended where the mask is set, black elsewhere
//!
//! Outputs are always RGB; grayscale sources are widened first.

mod writer;

pub use writer::{DiffArtifacts, COMBINED_STEM, ISOLATE_A_STEM, ISOLATE_B_STEM};

use crate::core::checker::check_compatible;
use crate::core::config::OutputConfig;
use crate::core::engine::DifferenceMask;
use crate::core::grid::PixelGrid;
use crate::error::{CompatibilityError, OutputError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the combined image merges the two sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendPolicy {
    /// `a + b`, clipped to 255
    #[default]
    Sum,
    /// `(a + b) / 2`, rounded down
    Midpoint,
}

impl BlendPolicy {
    #[inline]
    fn blend(&self, a: u8, b: u8) -> u8 {
        match self {
            BlendPolicy::Sum => a.saturating_add(b),
            BlendPolicy::Midpoint => ((a as u16 + b as u16) / 2) as u8,
        }
    }
}

impl std::fmt::Display for BlendPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlendPolicy::Sum => write!(f, "sum"),
            BlendPolicy::Midpoint => write!(f, "midpoint"),
        }
    }
}

/// The three reconstructed images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffImages {
    pub isolate_a: PixelGrid,
    pub isolate_b: PixelGrid,
    pub combined: PixelGrid,
}

/// Builds difference images from a mask
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstructor {
    blend: BlendPolicy,
}

impl Reconstructor {
    pub fn new(blend: BlendPolicy) -> Self {
        Self { blend }
    }

    pub fn blend(&self) -> BlendPolicy {
        self.blend
    }

    /// Derive isolate and combined images.
    ///
    /// Fails if the grids are incompatible or the mask has a different shape.
    pub fn reconstruct(
        &self,
        left: &PixelGrid,
        right: &PixelGrid,
        mask: &DifferenceMask,
    ) -> Result<DiffImages, CompatibilityError> {
        check_compatible(left, right)?;
        if mask.dimensions() != left.dimensions() {
            return Err(CompatibilityError::ShapeMismatch {
                left: left.dimensions(),
                right: mask.dimensions(),
            });
        }

        let left = left.to_rgb();
        let right = right.to_rgb();

        let mut isolate_a = left.zeroed();
        let mut isolate_b = left.zeroed();
        let mut combined = left.zeroed();

        for (i, _) in mask.bits().iter().enumerate().filter(|(_, &set)| set) {
            let range = i * 3..i * 3 + 3;
            let a = &left.samples()[range.clone()];
            let b = &right.samples()[range.clone()];

            isolate_a.samples_mut()[range.clone()].copy_from_slice(a);
            isolate_b.samples_mut()[range.clone()].copy_from_slice(b);
            for ((out, &x), &y) in combined.samples_mut()[range].iter_mut().zip(a).zip(b) {
                *out = self.blend.blend(x, y);
            }
        }

        debug!(
            differing = mask.count(),
            blend = %self.blend,
            "reconstructed difference images"
        );

        Ok(DiffImages {
            isolate_a,
            isolate_b,
            combined,
        })
    }

    /// Write the three images into the configured output directory
    pub fn save(
        &self,
        images: &DiffImages,
        output: &OutputConfig,
    ) -> Result<DiffArtifacts, OutputError> {
        writer::write_all(images, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::ColorMode;

    fn mask_with(width: u32, height: u32, set: &[(u32, u32)]) -> DifferenceMask {
        let mut bits = vec![false; (width * height) as usize];
        for &(x, y) in set {
            bits[(y * width + x) as usize] = true;
        }
        DifferenceMask::from_bits(width, height, bits).unwrap()
    }

    fn rgb(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> PixelGrid {
        let mut samples = Vec::new();
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        PixelGrid::from_raw(width, height, ColorMode::Rgb, samples).unwrap()
    }

    #[test]
    fn isolates_keep_source_values_only_where_masked() {
        let a = rgb(3, 2, |x, y| [x as u8 * 10, y as u8 * 10, 1]);
        let b = rgb(3, 2, |x, y| [200, x as u8 + y as u8, 2]);
        let mask = mask_with(3, 2, &[(1, 0), (2, 1)]);

        let images = Reconstructor::default().reconstruct(&a, &b, &mask).unwrap();

        for y in 0..2 {
            for x in 0..3 {
                if mask.get(x, y) {
                    assert_eq!(images.isolate_a.pixel(x, y), a.pixel(x, y));
                    assert_eq!(images.isolate_b.pixel(x, y), b.pixel(x, y));
                } else {
                    assert_eq!(images.isolate_a.pixel(x, y), &[0, 0, 0]);
                    assert_eq!(images.isolate_b.pixel(x, y), &[0, 0, 0]);
                    assert_eq!(images.combined.pixel(x, y), &[0, 0, 0]);
                }
            }
        }
    }

    #[test]
    fn sum_blend_clips() {
        let a = PixelGrid::filled(1, 1, &[200, 100, 0]).unwrap();
        let b = PixelGrid::filled(1, 1, &[100, 100, 5]).unwrap();
        let mask = mask_with(1, 1, &[(0, 0)]);

        let images = Reconstructor::new(BlendPolicy::Sum)
            .reconstruct(&a, &b, &mask)
            .unwrap();
        assert_eq!(images.combined.pixel(0, 0), &[255, 200, 5]);
    }

    #[test]
    fn midpoint_blend_averages() {
        let a = PixelGrid::filled(1, 1, &[255, 100, 0]).unwrap();
        let b = PixelGrid::filled(1, 1, &[0, 101, 7]).unwrap();
        let mask = mask_with(1, 1, &[(0, 0)]);

        let images = Reconstructor::new(BlendPolicy::Midpoint)
            .reconstruct(&a, &b, &mask)
            .unwrap();
        assert_eq!(images.combined.pixel(0, 0), &[127, 100, 3]);
    }

    #[test]
    fn grayscale_sources_become_rgb() {
        let a = PixelGrid::filled(2, 2, &[255]).unwrap();
        let b = PixelGrid::filled(2, 2, &[250]).unwrap();
        let mask = mask_with(2, 2, &[(0, 0), (1, 1)]);

        let images = Reconstructor::default().reconstruct(&a, &b, &mask).unwrap();
        assert_eq!(images.isolate_a.mode(), ColorMode::Rgb);
        assert_eq!(images.isolate_a.pixel(0, 0), &[255, 255, 255]);
        assert_eq!(images.isolate_b.pixel(1, 1), &[250, 250, 250]);
        assert_eq!(images.isolate_b.pixel(1, 0), &[0, 0, 0]);
    }

    #[test]
    fn mask_shape_must_match() {
        let a = PixelGrid::filled(2, 2, &[1, 2, 3]).unwrap();
        let mask = mask_with(3, 3, &[]);

        let err = Reconstructor::default()
            .reconstruct(&a, &a, &mask)
            .unwrap_err();
        assert!(matches!(err, CompatibilityError::ShapeMismatch { .. }));
    }

    #[test]
    fn incompatible_sources_are_rejected() {
        let a = PixelGrid::filled(2, 2, &[1, 2, 3]).unwrap();
        let b = PixelGrid::filled(2, 2, &[1]).unwrap();
        let mask = mask_with(2, 2, &[]);

        let err = Reconstructor::default().reconstruct(&a, &b, &mask).unwrap_err();
        assert!(matches!(err, CompatibilityError::ModeMismatch { .. }));
    }
}
