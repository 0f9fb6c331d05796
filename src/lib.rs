//! # Pixel Diff
//!
//! Compares two raster images and reports where and how much they differ.
//!
//! ## Core Philosophy
//! - **Exact counts** - a pixel differs only when its distance is strictly
//!   greater than the tolerance
//! - **Fail loudly** - size, mode and decode problems are errors, never a
//!   silent "no difference"
//! - **Show the difference** - every run can produce images isolating the
//!   changed pixels
//!
//! ## Architecture
//! - `core` - Loading, checking, comparison, reconstruction and reporting
//! - `events` - Progress reporting over channels
//! - `error` - Typed errors per stage
//!
//! ## Example
//! ```rust,ignore
//! use pixel_diff::core::pipeline::Pipeline;
//! use pixel_diff::core::Tolerance;
//!
//! let result = Pipeline::builder()
//!     .images("before.png", "after.png")
//!     .tolerance(Tolerance::new(5.0)?)
//!     .build()
//!     .run()?;
//!
//! println!("{}", result.report());
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PixelDiffError, Result};

/// Initialize tracing for the library.
///
/// Reads the filter from `RUST_LOG` and writes to stderr so that report
/// output on stdout stays clean. Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
