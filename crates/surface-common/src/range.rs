//! Min/max value ranges used as color-mapping domains.

use serde::{Deserialize, Serialize};

/// Closed `[min, max]` interval over the finite samples of an array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Linear scan over `samples`, skipping NaN and infinite values.
    ///
    /// Returns `None` if no finite sample exists.
    pub fn from_samples(samples: &[f32]) -> Option<Self> {
        samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range: Option<Self>, v| {
                Some(match range {
                    None => Self::new(v, v),
                    Some(r) => Self::new(r.min.min(v), r.max.max(v)),
                })
            })
    }

    /// True if `value` lies inside the range (inclusive).
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Width of the range.
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// The range as `[min, max]`.
    pub fn to_array(&self) -> [f32; 2] {
        [self.min, self.max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_skips_nan() {
        let range = ValueRange::from_samples(&[1.0, f32::NAN, 5.0, f32::NAN]).unwrap();
        assert_eq!(range.to_array(), [1.0, 5.0]);
    }

    #[test]
    fn test_range_skips_infinities() {
        let range = ValueRange::from_samples(&[f32::INFINITY, -2.0, f32::NEG_INFINITY]).unwrap();
        assert_eq!(range, ValueRange::new(-2.0, -2.0));
    }

    #[test]
    fn test_range_of_no_finite_values() {
        assert!(ValueRange::from_samples(&[]).is_none());
        assert!(ValueRange::from_samples(&[f32::NAN, f32::NAN]).is_none());
    }

    #[test]
    fn test_range_brackets_samples() {
        let samples = [3.5, -1.25, 8.0, 0.0, 2.0];
        let range = ValueRange::from_samples(&samples).unwrap();
        assert!(samples.iter().all(|&v| range.contains(v)));
        assert_eq!(range.span(), 9.25);
    }
}
