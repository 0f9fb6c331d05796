//! # Config Module
//!
//! Validated user settings: the tolerance percentage and where artifacts go.
//!
//! Everything here is checked before any image I/O happens.

use crate::error::ConfigError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory for difference images and reports
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default report file name inside the output directory
pub const DEFAULT_REPORT_FILE: &str = "comparison_report.txt";

/// Tolerance as a percentage in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    /// Strictest tolerance: any difference counts
    pub const ZERO: Tolerance = Tolerance(0.0);
    /// Loosest tolerance
    pub const MAX: Tolerance = Tolerance(100.0);

    pub fn new(percent: f64) -> Result<Self, ConfigError> {
        if !percent.is_finite() {
            return Err(ConfigError::ToleranceNotFinite {
                raw: percent.to_string(),
            });
        }
        if percent < 0.0 {
            return Err(ConfigError::ToleranceNegative { value: percent });
        }
        if percent > 100.0 {
            return Err(ConfigError::ToleranceTooLarge { value: percent });
        }
        Ok(Self(percent))
    }

    /// Parse user input such as `"12.5"`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let value: f64 = trimmed.parse().map_err(|_| ConfigError::ToleranceNotANumber {
            raw: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ConfigError::ToleranceNotFinite {
                raw: raw.to_string(),
            });
        }
        Self::new(value)
    }

    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Tolerance::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

impl std::str::FromStr for Tolerance {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tolerance::parse(s)
    }
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lossless encodings for difference images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffImageFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
}

impl DiffImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DiffImageFormat::Png => "png",
            DiffImageFormat::Bmp => "bmp",
            DiffImageFormat::Tiff => "tiff",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            DiffImageFormat::Png => ImageFormat::Png,
            DiffImageFormat::Bmp => ImageFormat::Bmp,
            DiffImageFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Where and how artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving all artifacts; created on demand
    pub dir: PathBuf,
    /// Encoding for the three difference images
    pub image_format: DiffImageFormat,
    /// Prepended to every difference image file name (e.g. `lab_`)
    pub file_prefix: String,
    /// Text report file name, relative to `dir` unless absolute
    pub report_file: PathBuf,
    /// Also write a JSON copy of the report next to the text one
    pub write_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            image_format: DiffImageFormat::Png,
            file_prefix: String::new(),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            write_json: false,
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn image_format(mut self, format: DiffImageFormat) -> Self {
        self.image_format = format;
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn report_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.report_file = file.into();
        self
    }

    pub fn write_json(mut self, write: bool) -> Self {
        self.write_json = write;
        self
    }

    /// Full path of a difference image, e.g. `output/diff_img1.png`
    pub fn image_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            self.file_prefix,
            stem,
            self.image_format.extension()
        ))
    }

    /// Full path of the text report
    pub fn report_path(&self) -> PathBuf {
        self.dir.join(&self.report_file)
    }

    /// Full path of the JSON report
    pub fn json_report_path(&self) -> PathBuf {
        self.report_path().with_extension("json")
    }

    /// Reject configurations that can never be written
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.as_os_str().is_empty() {
            return Err(invalid(&self.dir, "output directory is empty"));
        }
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(invalid(&self.dir, "exists and is not a directory"));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(invalid(
                Path::new(&self.file_prefix),
                "file prefix must not contain path separators",
            ));
        }
        if self.report_file.file_name().is_none() {
            return Err(invalid(&self.report_file, "report file has no file name"));
        }
        let report = self.report_path();
        if report.is_dir() {
            return Err(invalid(&report, "report path is a directory"));
        }
        Ok(())
    }
}

fn invalid(path: &Path, reason: &str) -> ConfigError {
    ConfigError::InvalidOutputPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn tolerance_accepts_bounds() {
        assert_eq!(Tolerance::new(0.0).unwrap(), Tolerance::ZERO);
        assert_eq!(Tolerance::new(100.0).unwrap(), Tolerance::MAX);
        assert_eq!(Tolerance::parse(" 12.5 ").unwrap().percent(), 12.5);
    }

    #[test]
    fn tolerance_rejects_out_of_range() {
        assert_eq!(
            Tolerance::parse("120"),
            Err(ConfigError::ToleranceTooLarge { value: 120.0 })
        );
        assert_eq!(
            Tolerance::parse("-0.5"),
            Err(ConfigError::ToleranceNegative { value: -0.5 })
        );
    }

    #[test]
    fn tolerance_rejects_garbage() {
        assert_eq!(
            Tolerance::parse("abc"),
            Err(ConfigError::ToleranceNotANumber { raw: "abc".into() })
        );
        assert!(matches!(
            Tolerance::parse("NaN"),
            Err(ConfigError::ToleranceNotFinite { .. })
        ));
        assert!(matches!(
            Tolerance::parse("inf"),
            Err(ConfigError::ToleranceNotFinite { .. })
        ));
    }

    #[test]
    fn tolerance_deserialization_is_validated() {
        let ok: Tolerance = serde_json::from_str("5.0").unwrap();
        assert_eq!(ok.percent(), 5.0);
        assert!(serde_json::from_str::<Tolerance>("101.0").is_err());
    }

    #[test]
    fn image_paths_use_prefix_and_extension() {
        let config = OutputConfig::new()
            .dir("out")
            .file_prefix("lab_")
            .image_format(DiffImageFormat::Tiff);

        assert_eq!(config.image_path("diff_img1"), PathBuf::from("out/lab_diff_img1.tiff"));
        assert_eq!(config.report_path(), PathBuf::from("out/comparison_report.txt"));
        assert_eq!(config.json_report_path(), PathBuf::from("out/comparison_report.json"));
    }

    #[test]
    fn validate_rejects_file_as_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        File::create(&file).unwrap();

        let err = OutputConfig::new().dir(&file).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOutputPath { .. }));
    }

    #[test]
    fn validate_rejects_separator_in_prefix() {
        let err = OutputConfig::new().file_prefix("a/b").validate().unwrap_err();
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn validate_accepts_missing_directory() {
        let temp = TempDir::new().unwrap();
        let config = OutputConfig::new().dir(temp.path().join("not/yet/created"));
        assert!(config.validate().is_ok());
    }
}
