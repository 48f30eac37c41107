//! Gaussian kernel density estimation.
//!
//! One-dimensional KDE with Scott's rule for the bandwidth factor, matching
//! the conventions of the usual scientific toolkits: the kernel standard
//! deviation is `factor * sample_std` where `factor = n^(-1/5)`.

use crate::error::{BestError, Result};
use crate::stats::variance;
use std::f64::consts::PI;

/// Gaussian KDE over a one-dimensional sample.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    dataset: Vec<f64>,
    factor: f64,
    bandwidth: f64,
}

impl GaussianKde {
    /// Build a KDE with Scott's bandwidth factor.
    ///
    /// # Errors
    ///
    /// Needs at least two samples with non-zero spread.
    pub fn new(samples: &[f64]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(BestError::InvalidInput(
                "kernel density estimation requires at least 2 samples".into(),
            ));
        }
        let sample_std = variance(samples, 1).sqrt();
        if !sample_std.is_finite() || sample_std <= 0.0 {
            return Err(BestError::InvalidInput(
                "kernel density estimation requires samples with non-zero spread".into(),
            ));
        }

        let factor = (samples.len() as f64).powf(-0.2);
        Ok(Self {
            dataset: samples.to_vec(),
            factor,
            bandwidth: factor * sample_std,
        })
    }

    /// Scott's factor `n^(-1/5)`.
    #[must_use]
    pub fn covariance_factor(&self) -> f64 {
        self.factor
    }

    /// Kernel standard deviation.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density estimate at `x`.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / ((2.0 * PI).sqrt() * h * self.dataset.len() as f64);
        self.dataset
            .iter()
            .map(|&xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// Density estimates at each point of `xs`.
    #[must_use]
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Grid size used by [`kde_mode`].
const MODE_GRID_POINTS: usize = 512;

/// Mode of a sample, located as the maximum of its Gaussian KDE.
///
/// The density is evaluated on a 512-point grid spanning the samples plus a
/// margin of `3 * factor^2` on each side. Constant samples return their value.
///
/// # Errors
///
/// Returns an error for empty samples.
pub fn kde_mode(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(BestError::empty_input("samples for mode estimation"));
    }
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    if min == max {
        return Ok(min);
    }

    let kernel = GaussianKde::new(samples)?;
    let bw = kernel.covariance_factor();
    let cut = 3.0 * bw;
    let grid = linspace(min - cut * bw, max + cut * bw, MODE_GRID_POINTS);

    let (mode, _) = grid
        .iter()
        .map(|&x| (x, kernel.evaluate(x)))
        .fold((min, f64::NEG_INFINITY), |best, (x, density)| {
            if density > best.1 {
                (x, density)
            } else {
                best
            }
        });
    Ok(mode)
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
#[must_use]
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scott_factor() {
        let samples: Vec<f64> = (0..32).map(f64::from).collect();
        let kde = GaussianKde::new(&samples).expect("valid samples");
        // 32^(-1/5) = 0.5
        assert!((kde.covariance_factor() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let samples = [-1.0, -0.5, 0.0, 0.2, 0.4, 1.5, 2.0];
        let kde = GaussianKde::new(&samples).expect("valid samples");
        let xs = linspace(-10.0, 10.0, 4001);
        let dx = xs[1] - xs[0];
        let area: f64 = kde.evaluate_many(&xs).iter().sum::<f64>() * dx;
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn test_density_peaks_near_cluster() {
        let samples = [0.0, 0.1, -0.1, 0.05, -0.05, 5.0];
        let kde = GaussianKde::new(&samples).expect("valid samples");
        assert!(kde.evaluate(0.0) > kde.evaluate(5.0));
    }

    #[test]
    fn test_degenerate_samples() {
        assert!(GaussianKde::new(&[1.0]).is_err());
        assert!(GaussianKde::new(&[2.0, 2.0, 2.0]).is_err());
    }

    #[test]
    fn test_kde_mode() {
        let samples = [0.0, 0.1, -0.1, 0.05, -0.05, 0.02, 3.0];
        let mode = kde_mode(&samples).expect("valid samples");
        assert!(mode.abs() < 0.3, "mode = {mode}");
        assert_eq!(kde_mode(&[2.5, 2.5]).expect("constant samples"), 2.5);
        assert!(kde_mode(&[]).is_err());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
