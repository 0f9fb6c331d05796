//! Persisting reconstructed images.

use super::DiffImages;
use crate::core::config::OutputConfig;
use crate::core::grid::PixelGrid;
use crate::error::OutputError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File stem of the first isolate image
pub const ISOLATE_A_STEM: &str = "diff_img1";
/// File stem of the second isolate image
pub const ISOLATE_B_STEM: &str = "diff_img2";
/// File stem of the combined image
pub const COMBINED_STEM: &str = "combined_diff";

/// Where the difference images were written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffArtifacts {
    pub isolate_a: PathBuf,
    pub isolate_b: PathBuf,
    pub combined: PathBuf,
}

impl DiffArtifacts {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.isolate_a, &self.isolate_b, &self.combined]
    }
}

pub(super) fn write_all(
    images: &DiffImages,
    output: &OutputConfig,
) -> Result<DiffArtifacts, OutputError> {
    fs::create_dir_all(&output.dir).map_err(|source| OutputError::CreateDirectory {
        path: output.dir.clone(),
        source,
    })?;

    let artifacts = DiffArtifacts {
        isolate_a: output.image_path(ISOLATE_A_STEM),
        isolate_b: output.image_path(ISOLATE_B_STEM),
        combined: output.image_path(COMBINED_STEM),
    };

    write_grid(&images.isolate_a, &artifacts.isolate_a, output)?;
    write_grid(&images.isolate_b, &artifacts.isolate_b, output)?;
    write_grid(&images.combined, &artifacts.combined, output)?;

    debug!(dir = %output.dir.display(), "wrote difference images");
    Ok(artifacts)
}

fn write_grid(grid: &PixelGrid, path: &Path, output: &OutputConfig) -> Result<(), OutputError> {
    let write_error = |reason: String| OutputError::WriteImage {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    grid.clone()
        .into_dynamic()
        .write_to(&mut writer, output.image_format.image_format())
        .map_err(|e| write_error(e.to_string()))?;
    writer.flush().map_err(|e| write_error(e.to_string()))?;
    Ok(())
}
