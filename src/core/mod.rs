//! # Core Module
//!
//! The UI-agnostic image comparison engine.
//!
//! ## Modules
//! - `grid` - In-memory pixel storage
//! - `loader` - Decodes image files into grids
//! - `checker` - Rejects pairs that cannot be compared
//! - `engine` - Per-pixel distances and the difference mask
//! - `reconstructor` - Difference images derived from the mask
//! - `reporter` - Statistics and report files
//! - `config` - Tolerance and output settings
//! - `pipeline` - Orchestrates the full workflow

pub mod checker;
pub mod config;
pub mod engine;
pub mod grid;
pub mod loader;
pub mod pipeline;
pub mod reconstructor;
pub mod reporter;

// Re-export commonly used types
pub use checker::{check_compatible, CompatibilityChecker};
pub use config::{DiffImageFormat, OutputConfig, Tolerance};
pub use engine::{CompareConfig, Comparison, DifferenceEngine, DifferenceMask, DistanceMetricKind};
pub use grid::{ColorMode, PixelGrid};
pub use loader::{ImageFilter, ImageLoader};
pub use reconstructor::{BlendPolicy, DiffArtifacts, DiffImages, Reconstructor};
pub use reporter::{ComparisonReport, ReportDocument};
