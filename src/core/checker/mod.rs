//! # Checker Module
//!
//! The single gate every pair of grids passes before per-pixel work.
//!
//! ## Rules
//! 1. Dimensions must be identical
//! 2. Color modes must be identical (grayscale never compares to RGB)
//! 3. Optionally, the source container formats must match

use crate::core::grid::{format_name, PixelGrid};
use crate::error::CompatibilityError;

/// Verifies two grids can be compared
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityChecker {
    /// Reject grids decoded from different container formats
    require_same_format: bool,
}

impl CompatibilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require both grids to come from the same container format
    pub fn require_same_format(mut self, require: bool) -> Self {
        self.require_same_format = require;
        self
    }

    /// Run every rule, returning the first violation
    pub fn check(&self, left: &PixelGrid, right: &PixelGrid) -> Result<(), CompatibilityError> {
        if left.dimensions() != right.dimensions() {
            return Err(CompatibilityError::ShapeMismatch {
                left: left.dimensions(),
                right: right.dimensions(),
            });
        }

        if left.mode() != right.mode() {
            return Err(CompatibilityError::ModeMismatch {
                left: left.mode(),
                right: right.mode(),
            });
        }

        if self.require_same_format && left.format() != right.format() {
            return Err(CompatibilityError::FormatMismatch {
                left: format_name(left.format()),
                right: format_name(right.format()),
            });
        }

        Ok(())
    }
}

/// Check shape and mode with the default rules
pub fn check_compatible(left: &PixelGrid, right: &PixelGrid) -> Result<(), CompatibilityError> {
    CompatibilityChecker::new().check(left, right)
}
