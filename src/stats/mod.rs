//! Descriptive statistics over posterior samples and observed data.
//!
//! Key features:
//!
//! - Mean, variance and standard deviation (population and sample)
//! - Percentiles with linear interpolation
//! - Highest density intervals ([`hdi`])
//! - Gaussian kernel density estimation ([`GaussianKde`])
//! - Fixed-width histograms for plotting
//! - Classical t-tests for comparison with the Bayesian answer
//!
//! # Examples
//!
//! ```
//! use best::stats::{mean, percentile, std};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0];
//! assert_eq!(mean(&data), 3.0);
//! assert!((std(&data) - 2.0_f64.sqrt()).abs() < 1e-12);
//! assert_eq!(percentile(&data, 0.5), 3.0);
//! ```

pub mod hdi;
pub mod hypothesis;
pub mod kde;

pub use hdi::hdi;
pub use hypothesis::{ttest_1samp, ttest_ind, TTestResult};
pub use kde::{kde_mode, linspace, GaussianKde};

use crate::error::{BestError, Result};
use serde::{Deserialize, Serialize};

/// Arithmetic mean. Returns NaN for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
#[must_use]
pub fn variance(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - ddof) as f64
}

/// Population standard deviation (divisor `n`).
#[must_use]
pub fn std(values: &[f64]) -> f64 {
    variance(values, 0).sqrt()
}

/// Calculate a percentile from a slice of values
///
/// Uses linear interpolation between data points.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let p = p.clamp(0.0, 1.0);
    let n = sorted.len();

    if n == 1 {
        return sorted[0];
    }

    let idx = p * (n - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Summary statistics for a distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Sample mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Median
    pub median: f64,
    /// Number of samples
    pub n: usize,
}

impl Statistics {
    /// Calculate statistics from values
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len();
        let std = if n > 1 { variance(values, 1).sqrt() } else { 0.0 };

        Self {
            mean: mean(values),
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            median: percentile(values, 0.5),
            n,
        }
    }

    /// Standard error of the mean
    #[must_use]
    pub fn sem(&self) -> f64 {
        if self.n > 0 {
            self.std / (self.n as f64).sqrt()
        } else {
            f64::INFINITY
        }
    }
}

/// Histogram representation with bin edges and counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges (length = `n_bins` + 1)
    pub bins: Vec<f64>,
    /// Bin counts (length = `n_bins`)
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Equal-width histogram spanning the data range.
    ///
    /// The last bin is closed on both sides so the maximum is counted.
    ///
    /// # Errors
    ///
    /// Returns an error for empty data or zero bins.
    pub fn new(values: &[f64], n_bins: usize) -> Result<Self> {
        if values.is_empty() {
            return Err(BestError::empty_input("histogram data"));
        }
        if n_bins == 0 {
            return Err(BestError::InvalidHyperparameter {
                param: "bins".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }

        let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // All values identical: one bin of unit width centred on the value
        if data_min == data_max {
            return Ok(Self {
                bins: vec![data_min - 0.5, data_max + 0.5],
                counts: vec![values.len()],
            });
        }

        let bin_width = (data_max - data_min) / n_bins as f64;
        let bins: Vec<f64> = (0..=n_bins)
            .map(|i| data_min + i as f64 * bin_width)
            .collect();

        let mut counts = vec![0usize; n_bins];
        for &value in values {
            let bin_idx = (((value - data_min) / bin_width) as usize).min(n_bins - 1);
            counts[bin_idx] += 1;
        }

        Ok(Self { bins, counts })
    }

    /// Bin densities, normalized so the histogram integrates to one.
    #[must_use]
    pub fn density(&self) -> Vec<f64> {
        let total: usize = self.counts.iter().sum();
        self.counts
            .iter()
            .zip(self.bins.windows(2))
            .map(|(&c, w)| c as f64 / (total as f64 * (w[1] - w[0])))
            .collect()
    }

    /// Largest bin count.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}
