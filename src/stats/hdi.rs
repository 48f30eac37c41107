//! Highest density interval (HDI) of a sample.
//!
//! The HDI is the narrowest interval that contains a given share of the
//! samples. For unimodal posteriors every point inside it is more probable
//! than every point outside, which is what makes it a credible interval
//! rather than an equal-tailed one.

use crate::error::{BestError, Result};

/// Check that a credible mass lies in (0, 1].
///
/// # Errors
///
/// Returns [`BestError::InvalidHyperparameter`] otherwise (NaN included).
pub fn validate_credible_mass(credible_mass: f64) -> Result<()> {
    if credible_mass > 0.0 && credible_mass <= 1.0 {
        Ok(())
    } else {
        Err(BestError::invalid_credible_mass(credible_mass))
    }
}

/// Calculate the highest density interval of `samples`.
///
/// Sorts the samples and slides a window of `floor(credible_mass * n)`
/// positions over them, returning the endpoints of the narrowest window.
///
/// # Errors
///
/// Returns an error if `samples` is empty or `credible_mass` is not in (0, 1].
///
/// # Example
///
/// ```
/// use best::stats::hdi;
///
/// let samples: Vec<f64> = (0..=100).map(f64::from).collect();
/// let (low, high) = hdi(&samples, 0.5).unwrap();
/// assert!((high - low - 50.0).abs() < 1e-9);
/// ```
pub fn hdi(samples: &[f64], credible_mass: f64) -> Result<(f64, f64)> {
    validate_credible_mass(credible_mass)?;
    if samples.is_empty() {
        return Err(BestError::empty_input("hdi samples"));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let interval_idx_inc = (credible_mass * n as f64).floor() as usize;
    if interval_idx_inc >= n {
        return Ok((sorted[0], sorted[n - 1]));
    }
    let n_intervals = n - interval_idx_inc;

    let (min_idx, _) = (0..n_intervals)
        .map(|i| (i, sorted[i + interval_idx_inc] - sorted[i]))
        .fold((0, f64::INFINITY), |best, (i, width)| {
            if width < best.1 {
                (i, width)
            } else {
                best
            }
        });

    Ok((sorted[min_idx], sorted[min_idx + interval_idx_inc]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdi_uniform_grid() {
        let samples: Vec<f64> = (0..1000).map(|i| f64::from(i) / 1000.0).collect();
        let (low, high) = hdi(&samples, 0.9).expect("valid input");
        assert!((high - low - 0.9).abs() < 0.002);
    }

    #[test]
    fn test_hdi_skewed_prefers_dense_region() {
        // Dense cluster near zero, sparse tail to the right
        let mut samples: Vec<f64> = (0..90).map(|i| f64::from(i) * 0.01).collect();
        samples.extend((0..10).map(|i| 10.0 + f64::from(i) * 10.0));
        let (low, high) = hdi(&samples, 0.8).expect("valid input");
        assert!(low.abs() < 1e-12);
        assert!(high < 1.0);
    }

    #[test]
    fn test_hdi_full_mass_is_range() {
        let samples = [3.0, -1.0, 2.0, 7.0];
        assert_eq!(hdi(&samples, 1.0).expect("valid input"), (-1.0, 7.0));
    }

    #[test]
    fn test_hdi_invalid_mass() {
        let samples = [1.0, 2.0, 3.0];
        for mass in [0.0, -0.5, 1.01, f64::NAN] {
            assert!(matches!(
                hdi(&samples, mass),
                Err(BestError::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn test_hdi_empty() {
        assert!(matches!(hdi(&[], 0.95), Err(BestError::EmptyInput(_))));
    }

    #[test]
    fn test_hdi_single_sample() {
        assert_eq!(hdi(&[4.2], 0.95).expect("valid input"), (4.2, 4.2));
    }
}
