//! Path checks applied before any decoding.

use crate::error::LoadError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Accepts only existing files with a supported raster extension
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// File extensions to accept (lowercase, without dot)
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Create a filter for the default raster formats
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "bmp", "tif", "tiff", "gif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check whether the extension alone is acceptable
    pub fn has_supported_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    /// Validate that `path` names an existing file with a supported extension.
    ///
    /// Existence is checked first so a missing `photo.pdf` reports as missing.
    pub fn validate(&self, path: &Path) -> Result<PathBuf, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        if !self.has_supported_extension(path) {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string();
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }

        Ok(path.to_path_buf())
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}
