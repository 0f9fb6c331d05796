//! Event type definitions for progress reporting.

use crate::core::engine::DistanceMetricKind;
use crate::core::grid::ColorMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the comparison pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Image loading events
    Load(LoadEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while decoding the input images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoadEvent {
    /// An image was decoded
    Loaded {
        path: PathBuf,
        width: u32,
        height: u32,
        mode: ColorMode,
    },
    /// An image could not be decoded
    Failed { path: PathBuf, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Loading,
    Checking,
    Comparing,
    Reconstructing,
    Reporting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Width x height of the compared images
    pub total_pixels: u64,
    /// Pixels whose distance exceeded the tolerance
    pub differing_pixels: u64,
    pub difference_percentage: f64,
    pub metric: DistanceMetricKind,
    /// Number of difference images written
    pub images_written: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Loading => write!(f, "Loading"),
            PipelinePhase::Checking => write!(f, "Checking"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
            PipelinePhase::Reconstructing => write!(f, "Reconstructing"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}
