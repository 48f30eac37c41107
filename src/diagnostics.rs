//! Convergence diagnostics for MCMC output
//!
//! Implements effective sample size (ESS), split R-hat, Monte Carlo standard
//! error (MCSE) and autocorrelation for assessing sample quality.
//!
//! Reference: Gelman et al. (2013), "Bayesian Data Analysis", Ch. 11;
//! Vehtari et al. (2021), "Rank-normalization, folding, and localization".

use crate::stats::{mean, variance};
use crate::trace::Trace;
use serde::{Deserialize, Serialize};

/// Largest acceptable split R-hat.
pub const RHAT_THRESHOLD: f64 = 1.05;

/// Smallest acceptable effective sample size (whole trace).
pub const ESS_THRESHOLD: f64 = 100.0;

/// Calculate autocorrelation at a given lag
#[must_use]
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag >= n {
        return 0.0;
    }

    let m = mean(values);
    let var: f64 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n as f64;

    if var < 1e-15 {
        return 0.0;
    }

    autocovariance(values, m, lag) / var
}

/// Biased autocovariance (divisor `n`) around a precomputed mean.
fn autocovariance(values: &[f64], m: f64, lag: usize) -> f64 {
    let n = values.len();
    values[..n - lag]
        .iter()
        .zip(values[lag..].iter())
        .map(|(x, y)| (x - m) * (y - m))
        .sum::<f64>()
        / n as f64
}

/// Effective sample size over several chains.
///
/// Combines within-chain autocorrelations with the between-chain variance and
/// truncates the autocorrelation sum with Geyer's initial monotone sequence.
/// Returns NaN when the samples have no variance.
#[must_use]
pub fn ess(chains: &[&[f64]]) -> f64 {
    let m = chains.len();
    let n = chains.iter().map(|c| c.len()).min().unwrap_or(0);
    let total = (m * n) as f64;
    if m == 0 || n < 4 {
        return total;
    }

    let chain_means: Vec<f64> = chains.iter().map(|c| mean(&c[..n])).collect();
    let acov_at = |lag: usize| -> f64 {
        chains
            .iter()
            .zip(&chain_means)
            .map(|(c, &cm)| autocovariance(&c[..n], cm, lag))
            .sum::<f64>()
            / m as f64
    };

    let acov0 = acov_at(0);
    let within = acov0 * n as f64 / (n - 1) as f64;
    let between = if m > 1 { variance(&chain_means, 1) } else { 0.0 };
    let var_plus = within * (n - 1) as f64 / n as f64 + between;
    if !(var_plus > 1e-300) {
        return f64::NAN;
    }

    let rho = |lag: usize| -> f64 { 1.0 - (within - acov_at(lag)) / var_plus };

    // Sum of autocorrelation pairs (rho[2k] + rho[2k+1]) while positive and
    // non-increasing.
    let mut sum_pairs = 0.0;
    let mut previous_pair = f64::INFINITY;
    let mut lag = 0;
    while lag + 1 < n {
        let pair = rho(lag) + rho(lag + 1);
        if pair <= 0.0 {
            break;
        }
        let pair = pair.min(previous_pair);
        sum_pairs += pair;
        previous_pair = pair;
        lag += 2;
    }

    let tau = -1.0 + 2.0 * sum_pairs;
    if tau > 0.0 {
        (total / tau).min(total * total.log10().max(1.0))
    } else {
        total
    }
}

/// Split R-hat: potential scale reduction factor with every chain split in half.
///
/// Values close to 1 indicate that the chains agree. Returns NaN for chains
/// with fewer than four draws or without variance.
#[must_use]
pub fn split_rhat(chains: &[&[f64]]) -> f64 {
    let n = chains.iter().map(|c| c.len()).min().unwrap_or(0);
    if chains.is_empty() || n < 4 {
        return f64::NAN;
    }

    let half = n / 2;
    let halves: Vec<&[f64]> = chains
        .iter()
        .flat_map(|c| [&c[..half], &c[n - half..n]])
        .collect();

    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let within = halves.iter().map(|h| variance(h, 1)).sum::<f64>() / halves.len() as f64;
    let between = variance(&means, 1);
    if !(within > 1e-300) {
        return f64::NAN;
    }

    let var_plus = within * (half - 1) as f64 / half as f64 + between;
    (var_plus / within).sqrt()
}

/// Monte Carlo standard error of the posterior mean.
#[must_use]
pub fn mcse_mean(chains: &[&[f64]]) -> f64 {
    let all: Vec<f64> = chains.iter().flat_map(|c| c.iter().copied()).collect();
    let effective = ess(chains);
    if effective.is_finite() && effective > 0.0 && all.len() > 1 {
        variance(&all, 1).sqrt() / effective.sqrt()
    } else {
        f64::NAN
    }
}

/// Convergence report for one sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    /// Whether every checked variable passed both thresholds
    pub ok: bool,
    /// Largest finite split R-hat over the checked variables
    pub max_rhat: Option<f64>,
    /// Smallest finite ESS over the checked variables
    pub min_ess: Option<f64>,
    /// Human-readable description of each failed check
    pub warnings: Vec<String>,
    /// Sampling rounds run to produce the trace
    #[serde(default = "one_round")]
    pub rounds: usize,
}

fn one_round() -> usize {
    1
}

impl SampleReport {
    /// Check the given variables of a trace.
    ///
    /// Variables missing from the trace are skipped.
    #[must_use]
    pub fn from_trace(trace: &Trace, names: &[&str]) -> Self {
        let mut max_rhat: Option<f64> = None;
        let mut min_ess: Option<f64> = None;
        let mut warnings = Vec::new();

        for name in names {
            let Ok(chains) = trace.chains(name) else {
                continue;
            };
            let rhat = split_rhat(&chains);
            let effective = ess(&chains);

            if rhat.is_finite() {
                max_rhat = Some(max_rhat.map_or(rhat, |m| m.max(rhat)));
            }
            if effective.is_finite() {
                min_ess = Some(min_ess.map_or(effective, |m| m.min(effective)));
            }

            if !rhat.is_finite() || rhat > RHAT_THRESHOLD {
                warnings.push(format!(
                    "R-hat for '{name}' is {rhat:.3} (threshold {RHAT_THRESHOLD})"
                ));
            }
            if !effective.is_finite() || effective < ESS_THRESHOLD {
                warnings.push(format!(
                    "effective sample size for '{name}' is {effective:.0} (threshold {ESS_THRESHOLD})"
                ));
            }
        }

        Self {
            ok: warnings.is_empty(),
            max_rhat,
            min_ess,
            warnings,
            rounds: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::{Distribution, StandardNormal};

    fn iid_chain(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| StandardNormal.sample(&mut rng)).collect()
    }

    fn ar1_chain(seed: u64, n: usize, phi: f64) -> Vec<f64> {
        let noise = iid_chain(seed, n);
        let mut x = 0.0;
        noise
            .into_iter()
            .map(|e| {
                x = phi * x + e;
                x
            })
            .collect()
    }

    #[test]
    fn test_autocorrelation_lag_zero() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((autocorrelation(&values, 0) - 1.0).abs() < 0.001);
        assert!((autocorrelation(&values, 10)).abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_random() {
        let values = iid_chain(42, 500);
        let rho_1 = autocorrelation(&values, 1);
        assert!(rho_1.abs() < 0.15, "Autocorrelation should be low: {rho_1}");
    }

    #[test]
    fn test_ess_iid_close_to_n() {
        let a = iid_chain(1, 1000);
        let b = iid_chain(2, 1000);
        let effective = ess(&[&a, &b]);
        assert!(effective > 1400.0 && effective < 2700.0, "ess = {effective}");
    }

    #[test]
    fn test_ess_autocorrelated_is_smaller() {
        let a = ar1_chain(3, 2000, 0.9);
        let b = ar1_chain(4, 2000, 0.9);
        let effective = ess(&[&a, &b]);
        // Theoretical ESS for AR(1) with phi = 0.9 is N * 0.1 / 1.9 ~= 210
        assert!(effective > 80.0 && effective < 500.0, "ess = {effective}");
    }

    #[test]
    fn test_ess_constant_is_nan() {
        let c = vec![1.0; 50];
        assert!(ess(&[&c, &c]).is_nan());
    }

    #[test]
    fn test_ess_short_chain() {
        let c = vec![1.0, 2.0, 3.0];
        assert!((ess(&[&c]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rhat_agreeing_chains() {
        let a = iid_chain(5, 1000);
        let b = iid_chain(6, 1000);
        let rhat = split_rhat(&[&a, &b]);
        assert!(rhat < 1.02, "rhat = {rhat}");
    }

    #[test]
    fn test_rhat_disagreeing_chains() {
        let a = iid_chain(7, 500);
        let b: Vec<f64> = iid_chain(8, 500).into_iter().map(|x| x + 5.0).collect();
        assert!(split_rhat(&[&a, &b]) > 1.5);
    }

    #[test]
    fn test_rhat_too_short() {
        let c = vec![1.0, 2.0];
        assert!(split_rhat(&[&c]).is_nan());
        assert!(split_rhat(&[]).is_nan());
    }

    #[test]
    fn test_mcse_mean_shrinks_with_samples() {
        let short = iid_chain(9, 100);
        let long = iid_chain(10, 10_000);
        assert!(mcse_mean(&[&long]) < mcse_mean(&[&short]));
        assert!((mcse_mean(&[&long]) - 0.01).abs() < 0.003);
    }

    #[test]
    fn test_report_flags_bad_chains() {
        let a = iid_chain(11, 400);
        let b: Vec<f64> = iid_chain(12, 400).into_iter().map(|x| x + 3.0).collect();
        let chains = vec![
            a.iter().map(|&x| vec![x]).collect::<Vec<_>>(),
            b.iter().map(|&x| vec![x]).collect::<Vec<_>>(),
        ];
        let trace = Trace::from_chain_points(&["x"], &chains).expect("valid chains");
        let report = SampleReport::from_trace(&trace, &["x", "missing"]);
        assert!(!report.ok);
        assert!(report.max_rhat.expect("finite R-hat") > RHAT_THRESHOLD);
        assert!(report.warnings.iter().any(|w| w.contains("R-hat for 'x'")));
    }

    #[test]
    fn test_report_accepts_good_chains() {
        let chains: Vec<Vec<Vec<f64>>> = (0..2)
            .map(|c| iid_chain(20 + c, 500).into_iter().map(|x| vec![x]).collect())
            .collect();
        let trace = Trace::from_chain_points(&["x"], &chains).expect("valid chains");
        let report = SampleReport::from_trace(&trace, &["x"]);
        assert!(report.ok, "{:?}", report.warnings);
        assert!(report.min_ess.expect("finite ESS") > ESS_THRESHOLD);
    }

    #[test]
    fn test_report_without_checked_variables() {
        let trace = Trace::from_samples(vec![("x".to_string(), vec![1.0, 2.0, 3.0, 4.0])])
            .expect("valid samples");
        let report = SampleReport::from_trace(&trace, &["y"]);
        assert!(report.ok);
        assert_eq!(report.max_rhat, None);
        assert_eq!(report.min_ess, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_autocorr_bounded(values in prop::collection::vec(-10.0..10.0f64, 20..200)) {
                for lag in 1..5 {
                    let rho = autocorrelation(&values, lag);
                    prop_assert!((-1.0..=1.0).contains(&rho), "Autocorrelation out of bounds: {rho}");
                }
            }

            #[test]
            fn prop_ess_positive(values in prop::collection::vec(0.0..100.0f64, 10..300)) {
                let effective = ess(&[&values]);
                prop_assert!(effective.is_nan() || effective > 0.0);
            }
        }
    }
}
