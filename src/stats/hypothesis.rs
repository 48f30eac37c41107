//! Classical t-tests.
//!
//! Reported next to the Bayesian estimates so that the two approaches can be
//! compared on the same data.
//!
//! # Example
//!
//! ```
//! use best::stats::hypothesis::ttest_ind;
//!
//! let group1 = vec![2.3, 2.5, 2.7, 2.9, 3.1];
//! let group2 = vec![3.2, 3.4, 3.6, 3.8, 4.0];
//!
//! let result = ttest_ind(&group1, &group2).expect("valid t-test inputs");
//! assert!(result.statistic < 0.0);
//! assert!(result.pvalue < 0.05);
//! ```

use crate::error::{BestError, Result};
use crate::stats::{mean, variance};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    /// t-statistic
    pub statistic: f64,

    /// p-value (two-tailed)
    pub pvalue: f64,

    /// Degrees of freedom
    pub df: f64,
}

/// One-sample t-test: Tests if sample mean differs from population mean.
///
/// H₀: μ = `population_mean`
/// H₁: μ ≠ `population_mean`
///
/// # Errors
///
/// Requires at least two observations with non-zero spread.
pub fn ttest_1samp(sample: &[f64], population_mean: f64) -> Result<TTestResult> {
    let n = sample.len();
    if n < 2 {
        return Err(BestError::InvalidInput(
            "t-test requires at least 2 samples".into(),
        ));
    }

    let se = (variance(sample, 1) / n as f64).sqrt();
    let t_stat = (mean(sample) - population_mean) / se;
    let df = (n - 1) as f64;

    Ok(TTestResult {
        statistic: t_stat,
        pvalue: two_tailed_pvalue(t_stat, df)?,
        df,
    })
}

/// Welch's two-sample t-test (unequal variances).
///
/// H₀: μ₁ = μ₂
/// H₁: μ₁ ≠ μ₂
///
/// # Errors
///
/// Each sample must have at least two observations.
pub fn ttest_ind(sample1: &[f64], sample2: &[f64]) -> Result<TTestResult> {
    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;

    if sample1.len() < 2 || sample2.len() < 2 {
        return Err(BestError::InvalidInput(
            "Each sample must have at least 2 observations".into(),
        ));
    }

    let v1 = variance(sample1, 1) / n1;
    let v2 = variance(sample2, 1) / n2;
    let t_stat = (mean(sample1) - mean(sample2)) / (v1 + v2).sqrt();

    // Welch-Satterthwaite degrees of freedom
    let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));

    Ok(TTestResult {
        statistic: t_stat,
        pvalue: two_tailed_pvalue(t_stat, df)?,
        df,
    })
}

fn two_tailed_pvalue(t: f64, df: f64) -> Result<f64> {
    if !t.is_finite() || !df.is_finite() {
        return Err(BestError::InvalidInput(
            "t-test is undefined for samples without spread".into(),
        ));
    }
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| BestError::InvalidInput(format!("invalid degrees of freedom {df}: {e}")))?;
    Ok((2.0 * dist.cdf(-t.abs())).clamp(0.0, 1.0))
}
