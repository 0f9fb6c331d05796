//! # CLI Module
//!
//! Command-line interface for pixel-diff.
//!
//! ## Usage
//! ```bash
//! # Exact comparison, artifacts in ./output
//! pixel-diff compare --img1 a.png --img2 b.png
//!
//! # Allow each channel to move by 5% of its range
//! pixel-diff compare --img1 a.png --img2 b.png --tolerance 5
//!
//! # Perceptual comparison, JSON on stdout
//! pixel-diff compare --img1 a.jpg --img2 b.jpg --metric lab --output json
//! ```
//!
//! Exit status: 0 when the images are similar, 1 when they differ,
//! 2 on any error.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pixel_diff::core::config::{DiffImageFormat, OutputConfig, Tolerance, DEFAULT_OUTPUT_DIR};
use pixel_diff::core::engine::DistanceMetricKind;
use pixel_diff::core::loader::ImageFilter;
use pixel_diff::core::pipeline::{Pipeline, PipelineResult};
use pixel_diff::core::reconstructor::BlendPolicy;
use pixel_diff::error::Result;
use pixel_diff::events::{Event, EventChannel, LoadEvent, PipelineEvent, RecvTimeoutError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

/// Images are similar within tolerance
pub const EXIT_SIMILAR: u8 = 0;
/// At least one pixel differs
pub const EXIT_DIFFERENT: u8 = 1;
/// Invalid input or I/O failure
pub const EXIT_ERROR: u8 = 2;

/// Pixel Diff - Compare two images pixel by pixel
#[derive(Parser, Debug)]
#[command(name = "pixel-diff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two images using a tolerance value
    Compare {
        /// First image file to compare
        #[arg(long, value_parser = parse_image_path)]
        img1: PathBuf,

        /// Second image file to compare
        #[arg(long, value_parser = parse_image_path)]
        img2: PathBuf,

        /// Tolerance value (0-100)
        #[arg(short, long, alias = "tolerance_value", default_value = "0", value_parser = parse_tolerance)]
        tolerance: Tolerance,

        /// Distance metric
        #[arg(short, long, default_value = "channel")]
        metric: Metric,

        /// How the combined image merges both sources (default: midpoint for lab, sum otherwise)
        #[arg(short, long)]
        blend: Option<Blend>,

        /// Directory for difference images and reports
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Encoding for the difference images
        #[arg(short, long, default_value = "png")]
        format: ImageFormatArg,

        /// File name prefix for difference images (default: `lab_` for the lab metric)
        #[arg(long)]
        prefix: Option<String>,

        /// Also fail when the two files use different container formats
        #[arg(long)]
        require_same_format: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Do not write difference images
        #[arg(long)]
        no_images: bool,

        /// Also write the report as JSON
        #[arg(long)]
        json_report: bool,

        /// Compute on a single thread
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Metric {
    /// Per-channel absolute difference, tolerance is a share of 255
    Channel,
    /// CIE Lab Delta E, tolerance is a raw Delta E
    Lab,
}

impl From<Metric> for DistanceMetricKind {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Channel => DistanceMetricKind::Channel,
            Metric::Lab => DistanceMetricKind::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Blend {
    /// Sum of both pixels, clipped at 255
    Sum,
    /// Average of both pixels
    Midpoint,
}

impl From<Blend> for BlendPolicy {
    fn from(blend: Blend) -> Self {
        match blend {
            Blend::Sum => BlendPolicy::Sum,
            Blend::Midpoint => BlendPolicy::Midpoint,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImageFormatArg {
    Png,
    Bmp,
    Tiff,
}

impl From<ImageFormatArg> for DiffImageFormat {
    fn from(format: ImageFormatArg) -> Self {
        match format {
            ImageFormatArg::Png => DiffImageFormat::Png,
            ImageFormatArg::Bmp => DiffImageFormat::Bmp,
            ImageFormatArg::Tiff => DiffImageFormat::Tiff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (differing pixel count only)
    Minimal,
}

fn parse_image_path(raw: &str) -> std::result::Result<PathBuf, String> {
    ImageFilter::new()
        .validate(Path::new(raw))
        .map_err(|e| e.to_string())
}

fn parse_tolerance(raw: &str) -> std::result::Result<Tolerance, String> {
    Tolerance::parse(raw).map_err(|e| e.to_string())
}

/// Options for one `compare` invocation
struct CompareArgs {
    img1: PathBuf,
    img2: PathBuf,
    tolerance: Tolerance,
    metric: DistanceMetricKind,
    blend: BlendPolicy,
    output: OutputConfig,
    require_same_format: bool,
    write_images: bool,
    parallel: bool,
    format: OutputFormat,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            img1,
            img2,
            tolerance,
            metric,
            blend,
            output_dir,
            format,
            prefix,
            require_same_format,
            output,
            no_images,
            json_report,
            sequential,
        } => {
            let metric = DistanceMetricKind::from(metric);
            let (default_prefix, default_blend) = metric_defaults(metric);

            run_compare(CompareArgs {
                img1,
                img2,
                tolerance,
                metric,
                blend: blend.map_or(default_blend, BlendPolicy::from),
                output: OutputConfig::new()
                    .dir(output_dir)
                    .image_format(format.into())
                    .file_prefix(prefix.unwrap_or_else(|| default_prefix.to_string()))
                    .write_json(json_report),
                require_same_format,
                write_images: !no_images,
                parallel: !sequential,
                format: output,
            })
        }
    }
}

/// File prefix and blend a metric uses unless overridden
fn metric_defaults(metric: DistanceMetricKind) -> (&'static str, BlendPolicy) {
    match metric {
        DistanceMetricKind::Channel => ("", BlendPolicy::Sum),
        DistanceMetricKind::Perceptual => ("lab_", BlendPolicy::Midpoint),
    }
}

fn run_compare(args: CompareArgs) -> Result<ExitCode> {
    let term = Term::stderr();
    let pretty = matches!(args.format, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Pixel Diff").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .images(&args.img1, &args.img2)
        .tolerance(args.tolerance)
        .metric(args.metric)
        .blend(args.blend)
        .parallel(args.parallel)
        .output(args.output)
        .require_same_format(args.require_same_format)
        .write_images(args.write_images)
        .build();

    let (sender, receiver) = EventChannel::new();

    let spinner = pretty.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb
    });
    let spinner_clone = spinner.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || loop {
        let event = match receiver.recv_timeout(Duration::from_millis(80)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(ref pb) = spinner_clone {
                    pb.tick();
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let Some(ref pb) = spinner_clone else {
            continue;
        };
        match event {
            Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                pb.set_message(format!("{}...", phase));
            }
            Event::Load(LoadEvent::Loaded {
                path,
                width,
                height,
                mode,
            }) => {
                pb.println(format!(
                    "  {} {} ({}x{}, {})",
                    style("loaded").dim(),
                    path.display(),
                    width,
                    height,
                    mode
                ));
            }
            Event::Pipeline(
                PipelineEvent::Completed { .. }
                | PipelineEvent::Cancelled
                | PipelineEvent::Error { .. },
            ) => {
                pb.finish_and_clear();
            }
            _ => {}
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match args.format {
        OutputFormat::Pretty => print_pretty_results(&term, &result),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => println!("{}", result.report().differing_pixels),
    }

    Ok(ExitCode::from(if result.is_similar() {
        EXIT_SIMILAR
    } else {
        EXIT_DIFFERENT
    }))
}

fn print_pretty_results(term: &Term, result: &PipelineResult) {
    // The plain report goes to stdout so it can be piped
    println!("{}", result.report());

    term.write_line("").ok();
    let verdict = if result.is_similar() {
        style("✓ Images match within tolerance").green().bold()
    } else {
        style("✗ Images differ").red().bold()
    };
    term.write_line(&format!(
        "{} in {:.2}s ({} metric)",
        verdict,
        result.duration_ms as f64 / 1000.0,
        result.comparison.metric
    ))
    .ok();
    term.write_line(&format!(
        "  {}",
        style(result.comparison.metric.description()).dim()
    ))
    .ok();

    if let Some((x, y, w, h)) = result.comparison.mask.bounding_box() {
        term.write_line(&format!(
            "  {} {}x{} at ({}, {})",
            style("changed region:").dim(),
            w,
            h,
            x,
            y
        ))
        .ok();
    }

    if let Some(ref artifacts) = result.artifacts {
        for path in artifacts.paths() {
            term.write_line(&format!("  {} {}", style("wrote").dim(), path.display()))
                .ok();
        }
    }
    for path in [&result.report_path, &result.json_report_path]
        .into_iter()
        .flatten()
    {
        term.write_line(&format!("  {} {}", style("wrote").dim(), path.display()))
            .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    match serde_json::to_string_pretty(&result.document) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{} {}", style("error:").red().bold(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tolerance_parser_reports_distinct_messages() {
        assert!(parse_tolerance("abc").unwrap_err().contains("not a valid number"));
        assert!(parse_tolerance("-1").unwrap_err().contains("non-negative"));
        assert!(parse_tolerance("101").unwrap_err().contains("must not exceed 100"));
        assert_eq!(parse_tolerance("7.5").unwrap().percent(), 7.5);
    }

    #[test]
    fn image_parser_rejects_missing_file() {
        let err = parse_image_path("/definitely/not/here.png").unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn lab_metric_defaults_to_prefix_and_midpoint() {
        assert_eq!(
            metric_defaults(DistanceMetricKind::Perceptual),
            ("lab_", BlendPolicy::Midpoint)
        );
        assert_eq!(
            metric_defaults(DistanceMetricKind::Channel),
            ("", BlendPolicy::Sum)
        );
    }

    #[test]
    fn blend_is_unset_unless_given() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("a.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();
        let image = path.to_str().unwrap();

        let parse = |extra: &[&str]| {
            let mut args = vec!["pixel-diff", "compare", "--img1", image, "--img2", image];
            args.extend_from_slice(extra);
            match Cli::try_parse_from(args).unwrap().command {
                Commands::Compare { blend, metric, .. } => (blend, metric),
            }
        };

        assert!(matches!(parse(&["--metric", "lab"]), (None, Metric::Lab)));
        assert!(matches!(
            parse(&["--metric", "lab", "--blend", "sum"]),
            (Some(Blend::Sum), Metric::Lab)
        ));
    }

    #[test]
    fn unsupported_extension_fails_parsing() {
        let cli = Cli::try_parse_from([
            "pixel-diff",
            "compare",
            "--img1",
            "Cargo.toml",
            "--img2",
            "Cargo.toml",
        ]);
        // Cargo.toml exists but has an unsupported extension
        assert!(cli.is_err());
    }
}
