//! # Grid Module
//!
//! In-memory pixel storage shared by every stage.
//!
//! A [`PixelGrid`] is an interleaved, row-major buffer of 8-bit samples in one
//! of two channel layouts. It is immutable once built; every derived image is
//! a fresh allocation.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

/// Channel layout of a pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// One luminance sample per pixel
    Grayscale,
    /// Red, green and blue samples per pixel
    Rgb,
}

impl ColorMode {
    /// Number of samples stored per pixel
    pub fn channel_count(&self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Grayscale => write!(f, "L"),
            ColorMode::Rgb => write!(f, "RGB"),
        }
    }
}

/// Decoded image pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    mode: ColorMode,
    /// Container format the pixels were decoded from, if known
    format: Option<ImageFormat>,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Build a grid from raw interleaved samples.
    ///
    /// Returns `None` if either dimension is zero or the buffer length does
    /// not equal `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, mode: ColorMode, samples: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = width as usize * height as usize * mode.channel_count();
        if samples.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            mode,
            format: None,
            samples,
        })
    }

    /// Build a grid where every pixel has the same value.
    ///
    /// The channel layout follows the length of `pixel` (1 = grayscale,
    /// 3 = RGB). Any other length, or a zero dimension, yields `None`.
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Option<Self> {
        let mode = match pixel.len() {
            1 => ColorMode::Grayscale,
            3 => ColorMode::Rgb,
            _ => return None,
        };
        let count = width as usize * height as usize;
        let samples = pixel.iter().copied().cycle().take(count * pixel.len()).collect();
        Self::from_raw(width, height, mode, samples)
    }

    /// Convert a decoded image, collapsing it to grayscale or RGB.
    ///
    /// Alpha is discarded and samples wider than 8 bits are reduced.
    pub fn from_dynamic(image: &DynamicImage, format: Option<ImageFormat>) -> Option<Self> {
        let grid = if image.color().has_color() {
            let rgb = image.to_rgb8();
            Self::from_raw(rgb.width(), rgb.height(), ColorMode::Rgb, rgb.into_raw())
        } else {
            let luma = image.to_luma8();
            Self::from_raw(luma.width(), luma.height(), ColorMode::Grayscale, luma.into_raw())
        }?;
        Some(grid.with_format(format))
    }

    /// Tag the grid with the container format it came from
    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channel_count(&self) -> usize {
        self.mode.channel_count()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Number of pixels (width x height)
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Number of stored samples (pixels x channels)
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples in a single row
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channel_count()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Samples of the pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channel_count();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.samples[start..start + channels]
    }

    /// Black grid with the same shape and mode
    pub fn zeroed(&self) -> PixelGrid {
        PixelGrid {
            width: self.width,
            height: self.height,
            mode: self.mode,
            format: None,
            samples: vec![0; self.samples.len()],
        }
    }

    /// Mutable samples for building derived grids inside the crate
    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Return an RGB copy; grayscale samples are replicated into all three channels
    pub fn to_rgb(&self) -> PixelGrid {
        match self.mode {
            ColorMode::Rgb => self.clone(),
            ColorMode::Grayscale => PixelGrid {
                width: self.width,
                height: self.height,
                mode: ColorMode::Rgb,
                format: self.format,
                samples: self.samples.iter().flat_map(|&v| [v, v, v]).collect(),
            },
        }
    }

    /// Convert into an `image` crate buffer for encoding
    pub fn into_dynamic(self) -> DynamicImage {
        let (width, height) = (self.width, self.height);
        match self.mode {
            // Buffer lengths were validated on construction.
            ColorMode::Rgb => RgbImage::from_raw(width, height, self.samples)
                .map(DynamicImage::ImageRgb8)
                .unwrap_or_else(|| DynamicImage::new_rgb8(width, height)),
            ColorMode::Grayscale => GrayImage::from_raw(width, height, self.samples)
                .map(DynamicImage::ImageLuma8)
                .unwrap_or_else(|| DynamicImage::new_luma8(width, height)),
        }
    }
}

/// Human-readable name for a container format
pub fn format_name(format: Option<ImageFormat>) -> String {
    match format {
        Some(format) => format!("{:?}", format).to_uppercase(),
        None => "UNKNOWN".to_string(),
    }
}
