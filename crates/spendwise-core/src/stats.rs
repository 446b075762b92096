//! Small numeric helpers shared by the analyzers

/// Mean and population standard deviation of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub mean: f64,
    /// Population (not sample) standard deviation
    pub std_dev: f64,
}

impl Distribution {
    /// Returns None for an empty sample
    pub fn of(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Absolute z-score, or None when the spread is zero
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std_dev > 0.0 {
            Some((value - self.mean).abs() / self.std_dev)
        } else {
            None
        }
    }
}

/// Arithmetic mean, None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to a fixed number of decimals, ties to even
///
/// Analyzer outputs use this so that `12.5` rounds to `12` and `13.5` to
/// `14`, the way Python's `round` and pandas `.round` report them.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Round to a fixed number of decimals, ties away from zero
///
/// Used for the insight cards, which mirror JavaScript's `toFixed`.
pub fn round_away(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std() {
        let dist = Distribution::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(dist.mean, 5.0);
        // Population std of this classic sample is exactly 2 (sample std would be ~2.14)
        assert!((dist.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spread_has_no_z_score() {
        let dist = Distribution::of(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(dist.std_dev, 0.0);
        assert_eq!(dist.z_score(3.0), None);
    }

    #[test]
    fn test_empty_sample() {
        assert!(Distribution::of(&[]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.345_678, 2), 2.35);
        assert_eq!(round_to(12.0, 1), 12.0);
    }

    #[test]
    fn test_round_to_breaks_ties_to_even() {
        // Exactly representable ties
        assert_eq!(round_to(12.25, 1), 12.2);
        assert_eq!(round_to(12.75, 1), 12.8);
        assert_eq!(round_to(-1.25, 1), -1.2);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn test_round_away_breaks_ties_up() {
        assert_eq!(round_away(12.25, 1), 12.3);
        assert_eq!(round_away(-1.25, 1), -1.3);
        assert_eq!(round_away(2.5, 0), 3.0);
        assert_eq!(round_away(2.345_678, 2), 2.35);
    }
}
