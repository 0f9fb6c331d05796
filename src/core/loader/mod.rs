//! # Loader Module
//!
//! Turns an image file or byte stream into a [`PixelGrid`].
//!
//! ## Steps
//! 1. Read the bytes (memory-mapped for files of 1MB or more)
//! 2. Sniff the container format from magic bytes
//! 3. Decode (zune-jpeg for JPEG, image crate otherwise)
//! 4. Collapse to grayscale or RGB, 8 bits per sample
//!
//! Reading the file is the only side effect.

pub mod fast_decode;
mod filter;
pub mod mmap_read;

pub use fast_decode::FastDecoder;
pub use filter::ImageFilter;

use crate::core::grid::PixelGrid;
use crate::error::LoadError;
use std::path::Path;
use tracing::debug;

/// Decodes image resources into pixel grids
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load an image file
    pub fn load(&self, path: &Path) -> Result<PixelGrid, LoadError> {
        let bytes = mmap_read::read_file_bytes(path)?;
        debug!(path = %path.display(), size = bytes.len(), mapped = bytes.is_mapped(), "read image file");
        self.load_from_memory(&bytes, path)
    }

    /// Load an image from an in-memory byte stream.
    ///
    /// `label` identifies the stream in error messages.
    pub fn load_from_memory(&self, bytes: &[u8], label: &Path) -> Result<PixelGrid, LoadError> {
        let (image, format) = FastDecoder::decode(bytes, label)?;

        let grid = PixelGrid::from_dynamic(&image, Some(format)).ok_or_else(|| {
            LoadError::EmptyImage {
                path: label.to_path_buf(),
            }
        })?;

        debug!(
            path = %label.display(),
            width = grid.width(),
            height = grid.height(),
            mode = %grid.mode(),
            format = ?format,
            "decoded image"
        );

        Ok(grid)
    }
}
