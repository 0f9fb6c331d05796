//! JSON export of comparison results.
//!
//! The JSON document carries the report figures plus what produced them,
//! so results from different runs can be archived side by side.

use super::ComparisonReport;
use crate::core::engine::{Comparison, DistanceMetricKind};
use crate::core::reconstructor::DiffArtifacts;
use crate::error::OutputError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Machine-readable comparison result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(flatten)]
    pub report: ComparisonReport,
    pub similar: bool,
    pub metric: DistanceMetricKind,
    /// Absolute threshold the field was compared against
    pub threshold: f64,
    pub max_distance: f64,
    pub mean_distance: f64,
    /// Bounding box `(x, y, width, height)` of all differing pixels
    pub bounding_box: Option<(u32, u32, u32, u32)>,
    pub inputs: Option<(PathBuf, PathBuf)>,
    pub artifacts: Option<DiffArtifacts>,
    pub generated_at: DateTime<Utc>,
}

impl ReportDocument {
    pub fn new(report: ComparisonReport, comparison: &Comparison) -> Self {
        Self {
            report,
            similar: report.is_similar(),
            metric: comparison.metric,
            threshold: comparison.threshold,
            max_distance: comparison.max_distance,
            mean_distance: comparison.mean_distance,
            bounding_box: comparison.mask.bounding_box(),
            inputs: None,
            artifacts: None,
            generated_at: Utc::now(),
        }
    }

    pub fn with_inputs(mut self, first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Self {
        self.inputs = Some((first.into(), second.into()));
        self
    }

    pub fn with_artifacts(mut self, artifacts: Option<DiffArtifacts>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Serialize as pretty-printed JSON into any sink
    pub fn emit<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}

/// Write `document` to `path` as JSON, creating parent directories
pub fn write_json(document: &ReportDocument, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source| OutputError::WriteReport {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    document.emit(BufWriter::new(file)).map_err(write_error)
}
