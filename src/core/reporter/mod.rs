//! # Reporter Module
//!
//! Turns a comparison into numbers a person can read.
//!
//! ## Output
//! ```text
//! Image Comparison Report:
//! The images are not similar
//! Total Pixels: 10000
//! Pixels Differing: 100
//! Difference Percentage: 1.00%
//! Tolerance Value: 0.0%
//! ```
//!
//! The same figures can be exported as JSON together with the metric,
//! distance statistics and artifact paths (see [`ReportDocument`]).

mod export;

pub use export::{write_json, ReportDocument};

use crate::core::config::Tolerance;
use crate::error::OutputError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Summary statistics for one comparison run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub total_pixels: u64,
    pub differing_pixels: u64,
    /// `differing_pixels / total_pixels * 100`
    pub difference_percentage: f64,
    pub tolerance_percentage: f64,
}

impl ComparisonReport {
    pub fn new(differing_pixels: u64, total_pixels: u64, tolerance: Tolerance) -> Self {
        let difference_percentage = if total_pixels == 0 {
            0.0
        } else {
            differing_pixels as f64 / total_pixels as f64 * 100.0
        };
        Self {
            total_pixels,
            differing_pixels,
            difference_percentage,
            tolerance_percentage: tolerance.percent(),
        }
    }

    /// True when no pixel differs beyond the tolerance
    pub fn is_similar(&self) -> bool {
        self.differing_pixels == 0
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_similar() {
            "The images are similar"
        } else {
            "The images are not similar"
        }
    }

    /// Multi-line text form
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the text form to any sink
    pub fn emit<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "{}", self)?;
        writer.flush()
    }

    /// Write the text form to `path`, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<(), OutputError> {
        let write_error = |source| OutputError::WriteReport {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(path).map_err(write_error)?;
        self.emit(BufWriter::new(file)).map_err(write_error)?;

        debug!(path = %path.display(), "wrote comparison report");
        Ok(())
    }
}

impl std::fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Image Comparison Report:")?;
        writeln!(f, "{}", self.verdict())?;
        writeln!(f, "Total Pixels: {}", self.total_pixels)?;
        writeln!(f, "Pixels Differing: {}", self.differing_pixels)?;
        writeln!(f, "Difference Percentage: {:.2}%", self.difference_percentage)?;
        // Whole percentages keep their decimal point, e.g. `5.0%`
        write!(f, "Tolerance Value: {:?}%", self.tolerance_percentage)
    }
}
