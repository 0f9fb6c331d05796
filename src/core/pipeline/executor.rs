//! Pipeline execution implementation.

use crate::core::checker::CompatibilityChecker;
use crate::core::config::{OutputConfig, Tolerance};
use crate::core::engine::{CompareConfig, Comparison, DifferenceEngine, DistanceMetricKind};
use crate::core::grid::PixelGrid;
use crate::core::loader::ImageLoader;
use crate::core::reconstructor::{BlendPolicy, DiffArtifacts};
use crate::core::reporter::{write_json, ComparisonReport, ReportDocument};
use crate::error::PixelDiffError;
use crate::events::{
    null_sender, Event, EventSender, LoadEvent, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared flag for stopping a run between stages
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run stops at the next stage boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Everything the report says, plus metric and artifact details
    pub document: ReportDocument,
    /// Raw comparison including the mask
    pub comparison: Comparison,
    /// Difference images, if they were written
    pub artifacts: Option<DiffArtifacts>,
    /// Text report, if it was written
    pub report_path: Option<PathBuf>,
    /// JSON report, if it was written
    pub json_report_path: Option<PathBuf>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn report(&self) -> &ComparisonReport {
        &self.document.report
    }

    /// True when no pixel differs beyond the tolerance
    pub fn is_similar(&self) -> bool {
        self.document.report.is_similar()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// First image
    pub first: PathBuf,
    /// Second image
    pub second: PathBuf,
    /// Metric, tolerance, blend and parallelism
    pub compare: CompareConfig,
    /// Where artifacts go
    pub output: OutputConfig,
    /// Also reject pairs decoded from different container formats
    pub require_same_format: bool,
    /// Write the three difference images
    pub write_images: bool,
    /// Write the text report (and JSON if enabled in `output`)
    pub write_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            first: PathBuf::new(),
            second: PathBuf::new(),
            compare: CompareConfig::default(),
            output: OutputConfig::default(),
            require_same_format: false,
            write_images: true,
            write_report: true,
        }
    }
}

/// Builder for pipeline configuration
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    cancellation: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the two images to compare
    pub fn images(mut self, first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Self {
        self.config.first = first.into();
        self.config.second = second.into();
        self
    }

    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.config.compare = self.config.compare.tolerance(tolerance);
        self
    }

    pub fn metric(mut self, metric: DistanceMetricKind) -> Self {
        self.config.compare = self.config.compare.metric(metric);
        self
    }

    pub fn blend(mut self, blend: BlendPolicy) -> Self {
        self.config.compare = self.config.compare.blend(blend);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.compare = self.config.compare.parallel(parallel);
        self
    }

    /// Replace the whole comparison configuration
    pub fn compare_config(mut self, config: CompareConfig) -> Self {
        self.config.compare = config;
        self
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.config.output = output;
        self
    }

    pub fn require_same_format(mut self, require: bool) -> Self {
        self.config.require_same_format = require;
        self
    }

    pub fn write_images(mut self, write: bool) -> Self {
        self.config.write_images = write;
        self
    }

    pub fn write_report(mut self, write: bool) -> Self {
        self.config.write_report = write;
        self
    }

    /// Attach a token that can stop the run from another thread
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            engine: self.config.compare.build(),
            config: self.config,
            loader: ImageLoader::new(),
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

/// Load, check, compare, reconstruct and report one image pair
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    engine: DifferenceEngine,
    loader: ImageLoader,
    cancellation: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, PixelDiffError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, PixelDiffError> {
        events.pipeline(PipelineEvent::Started);

        let result = self.execute(events);
        match &result {
            Err(PixelDiffError::Cancelled) => events.pipeline(PipelineEvent::Cancelled),
            Err(e) => events.pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }),
            Ok(_) => {}
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult, PixelDiffError> {
        let start_time = Instant::now();
        let output = &self.config.output;

        // Configuration problems surface before any file is touched
        if self.config.write_images || self.config.write_report {
            output.validate()?;
        }

        // Phase 1: Loading
        self.checkpoint()?;
        events.phase(PipelinePhase::Loading);
        let (first, second) = rayon::join(
            || self.load(&self.config.first, events),
            || self.load(&self.config.second, events),
        );
        let (first, second) = (first?, second?);

        // Phase 2: Checking
        self.checkpoint()?;
        events.phase(PipelinePhase::Checking);
        CompatibilityChecker::new()
            .require_same_format(self.config.require_same_format)
            .check(&first, &second)?;

        // Phase 3: Comparing
        self.checkpoint()?;
        events.phase(PipelinePhase::Comparing);
        let comparison = self.engine.compare(&first, &second)?;

        // Phase 4: Reconstructing
        let artifacts = if self.config.write_images {
            self.checkpoint()?;
            events.phase(PipelinePhase::Reconstructing);
            let reconstructor = self.engine.reconstructor();
            let images = reconstructor.reconstruct(&first, &second, &comparison.mask)?;
            Some(reconstructor.save(&images, output)?)
        } else {
            None
        };
        drop((first, second));

        // Phase 5: Reporting
        self.checkpoint()?;
        events.phase(PipelinePhase::Reporting);
        let report = ComparisonReport::new(
            comparison.differing_pixels,
            comparison.total_pixels,
            self.engine.tolerance(),
        );
        let document = ReportDocument::new(report, &comparison)
            .with_inputs(&self.config.first, &self.config.second)
            .with_artifacts(artifacts.clone());

        let mut report_path = None;
        let mut json_report_path = None;
        if self.config.write_report {
            let path = output.report_path();
            report.persist(&path)?;
            report_path = Some(path);

            if output.write_json {
                let path = output.json_report_path();
                write_json(&document, &path)?;
                json_report_path = Some(path);
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            differing = report.differing_pixels,
            total = report.total_pixels,
            percentage = report.difference_percentage,
            metric = %comparison.metric,
            duration_ms,
            "comparison complete"
        );

        events.pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_pixels: report.total_pixels,
                differing_pixels: report.differing_pixels,
                difference_percentage: report.difference_percentage,
                metric: comparison.metric,
                images_written: artifacts.as_ref().map_or(0, |a| a.paths().len()),
                duration_ms,
            },
        });

        Ok(PipelineResult {
            document,
            comparison,
            artifacts,
            report_path,
            json_report_path,
            duration_ms,
        })
    }

    fn load(&self, path: &Path, events: &EventSender) -> Result<PixelGrid, PixelDiffError> {
        match self.loader.load(path) {
            Ok(grid) => {
                events.send(Event::Load(LoadEvent::Loaded {
                    path: path.to_path_buf(),
                    width: grid.width(),
                    height: grid.height(),
                    mode: grid.mode(),
                }));
                Ok(grid)
            }
            Err(e) => {
                events.send(Event::Load(LoadEvent::Failed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }

    fn checkpoint(&self) -> Result<(), PixelDiffError> {
        if self.cancellation.is_cancelled() {
            debug!("pipeline cancelled");
            return Err(PixelDiffError::Cancelled);
        }
        Ok(())
    }
}
