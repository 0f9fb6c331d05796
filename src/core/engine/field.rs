//! Per-pixel difference magnitudes and the boolean mask derived from them.

/// Non-negative distance per pixel, channel axis collapsed
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceField {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl DifferenceField {
    /// Wrap row-major magnitudes; `None` if the length does not match
    pub fn from_values(width: u32, height: u32, values: Vec<f64>) -> Option<Self> {
        if values.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// Caller guarantees `values.len() == width * height`
    pub(super) fn from_parts(width: u32, height: u32, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), width as usize * height as usize);
        Self {
            width,
            height,
            values,
        }
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

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Largest magnitude, 0.0 for an empty field
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Mean magnitude, 0.0 for an empty field
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Mark every pixel whose magnitude is strictly greater than `threshold`
    pub fn threshold(&self, threshold: f64) -> DifferenceMask {
        DifferenceMask {
            width: self.width,
            height: self.height,
            bits: self.values.iter().map(|&v| v > threshold).collect(),
        }
    }
}

/// `true` where a pixel differs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl DifferenceMask {
    /// Wrap row-major flags; `None` if the length does not match
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            bits,
        })
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

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Number of differing pixels
    pub fn count(&self) -> u64 {
        self.bits.iter().filter(|&&b| b).count() as u64
    }

    /// Total number of pixels covered by the mask
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Coordinates of differing pixels in row-major order
    pub fn differing(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    /// Smallest rectangle `(x, y, width, height)` holding every differing pixel
    pub fn bounding_box(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y) in self.differing() {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(values: &[f64], width: u32) -> DifferenceField {
        let height = values.len() as u32 / width;
        DifferenceField::from_values(width, height, values.to_vec()).unwrap()
    }

    #[test]
    fn threshold_is_strict() {
        let mask = field(&[0.0, 5.0, 5.0001, 10.0], 2).threshold(5.0);
        assert_eq!(mask.bits(), &[false, false, true, true]);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn mask_matches_field_everywhere() {
        let f = field(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        let mask = f.threshold(3.0);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(mask.get(x, y), f.get(x, y) > 3.0);
            }
        }
    }

    #[test]
    fn field_statistics() {
        let f = field(&[0.0, 2.0, 4.0, 10.0], 2);
        assert_eq!(f.max(), 10.0);
        assert_eq!(f.mean(), 4.0);
    }

    #[test]
    fn from_values_rejects_bad_length() {
        assert!(DifferenceField::from_values(2, 2, vec![0.0; 3]).is_none());
        assert!(DifferenceMask::from_bits(2, 2, vec![false; 5]).is_none());
    }

    #[test]
    fn differing_coordinates_and_bounds() {
        let mut bits = vec![false; 16];
        bits[5] = true; // (1, 1)
        bits[10] = true; // (2, 2)
        let mask = DifferenceMask::from_bits(4, 4, bits).unwrap();

        let coords: Vec<_> = mask.differing().collect();
        assert_eq!(coords, vec![(1, 1), (2, 2)]);
        assert_eq!(mask.bounding_box(), Some((1, 1, 2, 2)));
    }

    #[test]
    fn empty_mask_has_no_bounds() {
        let mask = DifferenceMask::from_bits(3, 3, vec![false; 9]).unwrap();
        assert_eq!(mask.bounding_box(), None);
        assert_eq!(mask.count(), 0);
    }
}
