//! # Pipeline Module
//!
//! Runs one comparison end to end.
//!
//! ## Pipeline Stages
//! 1. **Load** - Decode both images (in parallel)
//! 2. **Check** - Reject pairs that differ in shape, mode or, optionally, format
//! 3. **Compare** - Build the difference mask
//! 4. **Reconstruct** - Write isolate and combined difference images
//! 5. **Report** - Compute statistics and persist the text/JSON report
//!
//! Output configuration is validated before stage 1, and a
//! [`CancellationToken`] is checked between stages.

mod executor;

pub use executor::{CancellationToken, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
