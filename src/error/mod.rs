//! # Error Module
//!
//! Typed failures for every stage of a comparison run.
//!
//! ## Design Principles
//! - **Fail early** - configuration is checked before any image I/O, and
//!   compatibility before any pixel work
//! - **Include context** - every message names the offending path or value
//! - **Never downgrade** - a failure is never reported as "no difference"

use std::path::PathBuf;
use thiserror::Error;

use crate::core::grid::ColorMode;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PixelDiffError {
    #[error("Loading error: {0}")]
    Load(#[from] LoadError),

    #[error("Images cannot be compared: {0}")]
    Compatibility(#[from] CompatibilityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Comparison was cancelled")]
    Cancelled,
}

/// Errors that occur while turning a file or byte stream into pixels
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File '{path}' does not exist.")]
    NotFound { path: PathBuf },

    #[error("File '{path}' is not a valid image format (extension: {extension}).")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("File '{path}' does not contain a recognizable raster image.")]
    UnrecognizedContent { path: PathBuf },

    #[error("Error loading image '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image '{path}' is empty or has zero dimensions.")]
    EmptyImage { path: PathBuf },

    #[error("Failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// The path (or stream label) the failure refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::UnsupportedFormat { path, .. }
            | LoadError::UnrecognizedContent { path }
            | LoadError::Decode { path, .. }
            | LoadError::EmptyImage { path }
            | LoadError::Io { path, .. } => path,
        }
    }
}

/// Errors raised by the compatibility gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityError {
    #[error("Images have different sizes: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    ShapeMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Image modes do not match: {left} vs {right}")]
    ModeMismatch { left: ColorMode, right: ColorMode },

    #[error("Image formats do not match: {left} vs {right}")]
    FormatMismatch { left: String, right: String },
}

/// Errors in user-supplied configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Tolerance value '{raw}' is not a valid number.")]
    ToleranceNotANumber { raw: String },

    #[error("Tolerance value '{raw}' is not a finite number.")]
    ToleranceNotFinite { raw: String },

    #[error("Tolerance value '{value}' must be non-negative.")]
    ToleranceNegative { value: f64 },

    #[error("Tolerance value '{value}' must not exceed 100.")]
    ToleranceTooLarge { value: f64 },

    #[error("Invalid output path {path}: {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Errors while persisting difference images or reports
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write difference image {path}: {reason}")]
    WriteImage { path: PathBuf, reason: String },

    #[error("Failed to write report {path}: {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PixelDiffError>;
