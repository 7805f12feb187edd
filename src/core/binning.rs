use crate::types::{SnowError, SnowResult};
use num_traits::Num;

/// Ordered value-to-class binning table.
///
/// A table of N strictly increasing upper-bound thresholds paired with
/// N+1 class labels defines the half-open bins
/// `(-inf, t0), [t0, t1), ..., [t_{N-1}, +inf)`. A value exactly equal
/// to a threshold falls into the upper bin: elevation 1500 against a
/// 1500 threshold belongs to the bin labeled 2000, not 1500. Zone
/// attribution at class boundaries depends on this direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBins<V, L> {
    thresholds: Vec<V>,
    labels: Vec<L>,
}

impl<V, L> ClassBins<V, L>
where
    V: Num + PartialOrd + Copy,
    L: Copy,
{
    /// Create a binning table from upper-bound thresholds and labels.
    ///
    /// Requires `labels.len() == thresholds.len() + 1` (the extra label
    /// covers values at or above the last threshold) and strictly
    /// increasing, well-ordered thresholds.
    pub fn new(thresholds: Vec<V>, labels: Vec<L>) -> SnowResult<Self> {
        if labels.len() != thresholds.len() + 1 {
            return Err(SnowError::InvalidConfig(format!(
                "Expected {} labels for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                labels.len()
            )));
        }

        for pair in thresholds.windows(2) {
            if !(pair[0] < pair[1]) {
                return Err(SnowError::InvalidConfig(
                    "Bin thresholds must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self { thresholds, labels })
    }

    /// Map a continuous value to its class label.
    ///
    /// Returns the label of the first bin whose upper bound exceeds the
    /// value; values at or above the last threshold get the final
    /// label. Every finite input maps to a label.
    pub fn map_value(&self, value: V) -> L {
        for (i, threshold) in self.thresholds.iter().enumerate() {
            if value < *threshold {
                return self.labels[i];
            }
        }
        self.labels[self.thresholds.len()]
    }

    /// Class labels, one per bin (first bin first)
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Number of bins (`thresholds + 1`)
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elevation_bins() -> ClassBins<f32, u16> {
        ClassBins::new(
            vec![1500.0, 2000.0, 2500.0, 3000.0, 3500.0, 4000.0],
            vec![1500, 2000, 2500, 3000, 3500, 4000, 4500],
        )
        .unwrap()
    }

    #[test]
    fn test_below_first_threshold() {
        let bins = elevation_bins();
        assert_eq!(bins.map_value(999.0), 1500);
        assert_eq!(bins.map_value(-250.0), 1500);
    }

    #[test]
    fn test_boundary_falls_in_upper_bin() {
        let bins = elevation_bins();
        // Exact threshold hits belong to the upper bin
        assert_eq!(bins.map_value(1500.0), 2000);
        assert_eq!(bins.map_value(2500.0), 3000);
        assert_eq!(bins.map_value(4000.0), 4500);
    }

    #[test]
    fn test_above_last_threshold() {
        let bins = elevation_bins();
        assert_eq!(bins.map_value(4500.0), 4500);
        assert_eq!(bins.map_value(8848.0), 4500);
    }

    #[test]
    fn test_interior_bins() {
        let bins = elevation_bins();
        assert_eq!(bins.map_value(1750.0), 2000);
        assert_eq!(bins.map_value(3999.9), 4000);
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let result = ClassBins::new(vec![1500.0, 2000.0], vec![1500, 2000]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let result = ClassBins::new(vec![2000.0, 1500.0], vec![1, 2, 3]);
        assert!(result.is_err());

        let result = ClassBins::new(vec![1500.0, 1500.0], vec![1, 2, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_bin_table() {
        // No thresholds: every value maps to the only label
        let bins: ClassBins<f32, u16> = ClassBins::new(vec![], vec![7]).unwrap();
        assert_eq!(bins.map_value(-1.0e6), 7);
        assert_eq!(bins.map_value(1.0e6), 7);
    }
}
