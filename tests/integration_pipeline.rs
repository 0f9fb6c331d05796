//! Integration tests for the pipeline module.
//!
//! These tests run complete comparisons against generated fixture images:
//! - Report and artifact files on disk
//! - Tolerance handling for both metrics
//! - Failures that must stop a run before anything is written

use assert_fs::prelude::*;
use assert_fs::TempDir;
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use pixel_diff::core::config::{OutputConfig, Tolerance};
use pixel_diff::core::engine::DistanceMetricKind;
use pixel_diff::core::pipeline::Pipeline;
use pixel_diff::core::reconstructor::BlendPolicy;
use pixel_diff::error::{CompatibilityError, LoadError};
use pixel_diff::PixelDiffError;
use predicates::prelude::*;
use std::path::PathBuf;

const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

fn green(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_pixel(width, height, GREEN)
}

/// Green 100x100 with a red 10x10 square at (10, 10)
fn red_square() -> RgbImage {
    ImageBuffer::from_fn(100, 100, |x, y| {
        if (10..20).contains(&x) && (10..20).contains(&y) {
            Rgb([255, 0, 0])
        } else {
            GREEN
        }
    })
}

/// Green 100x100 with a slightly shifted block and a further shifted block
fn tolerance_steps() -> RgbImage {
    ImageBuffer::from_fn(100, 100, |x, y| {
        if (20..30).contains(&x) && (20..30).contains(&y) {
            Rgb([12, 255, 12])
        } else if (30..40).contains(&x) && (30..40).contains(&y) {
            Rgb([25, 255, 25])
        } else {
            GREEN
        }
    })
}

fn save(temp: &TempDir, name: &str, image: &RgbImage) -> PathBuf {
    let child = temp.child(name);
    image.save(child.path()).unwrap();
    child.path().to_path_buf()
}

fn output(temp: &TempDir) -> OutputConfig {
    OutputConfig::new().dir(temp.child("output").path())
}

fn tol(percent: f64) -> Tolerance {
    Tolerance::new(percent).unwrap()
}

#[test]
fn identical_images_write_zero_percent_report() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green1.png", &green(100, 100));
    let b = save(&temp, "green2.png", &green(100, 100));

    let result = Pipeline::builder()
        .images(&a, &b)
        .output(output(&temp))
        .build()
        .run()
        .unwrap();

    assert!(result.is_similar());
    let report = temp.child("output/comparison_report.txt");
    report.assert(predicate::str::contains("Total Pixels: 10000"));
    report.assert(predicate::str::contains("Pixels Differing: 0"));
    report.assert(predicate::str::contains("Difference Percentage: 0.00%"));
    report.assert(predicate::str::contains("Tolerance Value: 0.0%"));
    report.assert(predicate::str::contains("The images are similar"));
}

#[test]
fn red_square_produces_three_artifacts() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(100, 100));
    let b = save(&temp, "red.png", &red_square());

    let result = Pipeline::builder()
        .images(&a, &b)
        .output(output(&temp))
        .build()
        .run()
        .unwrap();

    assert_eq!(result.report().differing_pixels, 100);
    assert_eq!(result.comparison.mask.bounding_box(), Some((10, 10, 10, 10)));

    temp.child("output/diff_img1.png").assert(predicate::path::is_file());
    temp.child("output/diff_img2.png").assert(predicate::path::is_file());
    temp.child("output/combined_diff.png").assert(predicate::path::is_file());
    temp.child("output/comparison_report.txt")
        .assert(predicate::str::contains("Difference Percentage: 1.00%"))
        .assert(predicate::str::contains("The images are not similar"));
}

#[test]
fn isolate_images_reproduce_sources_under_the_mask() {
    let temp = TempDir::new().unwrap();
    let a_image = green(100, 100);
    let b_image = red_square();
    let a = save(&temp, "a.png", &a_image);
    let b = save(&temp, "b.png", &b_image);

    let result = Pipeline::builder()
        .images(&a, &b)
        .output(output(&temp))
        .blend(BlendPolicy::Midpoint)
        .build()
        .run()
        .unwrap();

    let artifacts = result.artifacts.as_ref().unwrap();
    let isolate_a = image::open(&artifacts.isolate_a).unwrap().to_rgb8();
    let isolate_b = image::open(&artifacts.isolate_b).unwrap().to_rgb8();
    let combined = image::open(&artifacts.combined).unwrap().to_rgb8();

    for (x, y, pixel) in isolate_a.enumerate_pixels() {
        if result.comparison.mask.get(x, y) {
            assert_eq!(pixel, a_image.get_pixel(x, y));
            assert_eq!(isolate_b.get_pixel(x, y), b_image.get_pixel(x, y));
            assert_eq!(combined.get_pixel(x, y).0, [127, 127, 0]);
        } else {
            assert_eq!(pixel.0, [0, 0, 0]);
            assert_eq!(isolate_b.get_pixel(x, y).0, [0, 0, 0]);
            assert_eq!(combined.get_pixel(x, y).0, [0, 0, 0]);
        }
    }
}

#[test]
fn channel_tolerance_filters_small_shifts() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(100, 100));
    let b = save(&temp, "steps.png", &tolerance_steps());

    let count = |percent: f64| {
        Pipeline::builder()
            .images(&a, &b)
            .tolerance(tol(percent))
            .output(output(&temp))
            .write_images(false)
            .build()
            .run()
            .unwrap()
            .report()
            .differing_pixels
    };

    assert_eq!(count(0.0), 200);
    assert_eq!(count(5.0), 100);
    assert_eq!(count(10.0), 0);
    assert_eq!(count(100.0), 0);
}

#[test]
fn lab_tolerance_is_a_raw_delta_e() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(100, 100));
    let b = save(&temp, "steps.png", &tolerance_steps());

    let count = |delta_e: f64| {
        Pipeline::builder()
            .images(&a, &b)
            .metric(DistanceMetricKind::Perceptual)
            .tolerance(tol(delta_e))
            .output(output(&temp))
            .write_images(false)
            .build()
            .run()
            .unwrap()
            .report()
            .differing_pixels
    };

    assert_eq!(count(0.5), 200);
    assert_eq!(count(2.0), 100);
    assert_eq!(count(3.0), 0);
}

#[test]
fn lab_prefix_and_json_report() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(100, 100));
    let b = save(&temp, "red.png", &red_square());

    Pipeline::builder()
        .images(&a, &b)
        .metric(DistanceMetricKind::Perceptual)
        .output(output(&temp).file_prefix("lab_").write_json(true))
        .build()
        .run()
        .unwrap();

    temp.child("output/lab_combined_diff.png")
        .assert(predicate::path::is_file());
    temp.child("output/comparison_report.json")
        .assert(predicate::str::contains("\"metric\": \"Perceptual\""))
        .assert(predicate::str::contains("\"differing_pixels\": 100"));
}

#[test]
fn grayscale_pair_is_compared_on_one_channel() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("white.png");
    let b = temp.child("almost_white.png");
    ImageBuffer::from_pixel(100, 100, Luma([255u8]))
        .save(a.path())
        .unwrap();
    ImageBuffer::from_pixel(100, 100, Luma([250u8]))
        .save(b.path())
        .unwrap();

    let differing = |percent: f64| {
        Pipeline::builder()
            .images(a.path(), b.path())
            .tolerance(tol(percent))
            .output(output(&temp))
            .build()
            .run()
            .unwrap()
            .report()
            .differing_pixels
    };

    assert_eq!(differing(0.0), 10_000);
    assert_eq!(differing(2.0), 0);
}

#[test]
fn size_mismatch_stops_before_writing() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "small.png", &green(100, 100));
    let b = save(&temp, "large.png", &green(150, 150));

    let err = Pipeline::builder()
        .images(&a, &b)
        .output(output(&temp))
        .build()
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        PixelDiffError::Compatibility(CompatibilityError::ShapeMismatch {
            left: (100, 100),
            right: (150, 150),
        })
    ));
    assert!(err.to_string().contains("Images have different sizes"));
    temp.child("output").assert(predicate::path::missing());
}

#[test]
fn empty_jpeg_is_a_load_error() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(10, 10));
    let corrupt = temp.child("corrupted_image.jpg");
    corrupt.touch().unwrap();

    let err = Pipeline::builder()
        .images(&a, corrupt.path())
        .output(output(&temp))
        .build()
        .run()
        .unwrap_err();

    assert!(matches!(err, PixelDiffError::Load(LoadError::EmptyImage { .. })));
}

#[test]
fn pdf_is_not_an_image() {
    let temp = TempDir::new().unwrap();
    let a = save(&temp, "green.png", &green(10, 10));
    let pdf = temp.child("document.pdf");
    pdf.write_str("%PDF-1.4\n1 0 obj\n<< >>\nendobj\n%%EOF\n").unwrap();

    let err = Pipeline::builder()
        .images(&a, pdf.path())
        .output(output(&temp))
        .build()
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        PixelDiffError::Load(LoadError::UnrecognizedContent { .. })
    ));
}

#[test]
fn jpeg_compared_with_itself_is_identical() {
    let temp = TempDir::new().unwrap();
    let jpeg = save(&temp, "photo.jpg", &red_square());

    let result = Pipeline::builder()
        .images(&jpeg, &jpeg)
        .output(output(&temp))
        .require_same_format(true)
        .build()
        .run()
        .unwrap();

    assert!(result.is_similar());
    assert_eq!(result.report().total_pixels, 10_000);
}
