//! One-call analyses: build the model, sample the posterior, wrap the results.

use crate::error::Result;
use crate::model::{BestModel, BestModelOne, BestModelTwo};
use crate::results::{BestResults, BestResultsOne, BestResultsTwo};
use crate::sampler::{sample, SamplerConfig};
use std::time::Instant;
use tracing::info;

/// Analyze the difference between two groups.
///
/// Estimates the means, standard deviations and common normality parameter of
/// both groups, and derived quantities such as the difference of means and
/// the effect size. Sampling the default 2000 draws per chain takes a few
/// seconds for groups of a few hundred observations.
///
/// # Example
///
/// ```no_run
/// use best::analyze::analyze_two;
/// use best::sampler::SamplerConfig;
///
/// let drug = [101.0, 100.0, 102.0, 104.0, 102.0, 97.0, 105.0, 105.0, 98.0, 101.0];
/// let placebo = [99.0, 101.0, 100.0, 101.0, 102.0, 100.0, 97.0, 101.0, 104.0, 101.0];
/// let results = analyze_two(&drug, &placebo, &SamplerConfig::default()).unwrap();
/// let p = results.posterior_prob("Difference of means", Some(0.0), None).unwrap();
/// println!("P(mean drug > mean placebo) = {p:.3}");
/// ```
///
/// # Errors
///
/// Invalid observations (empty group, non-finite value, no spread) or invalid
/// sampler settings.
pub fn analyze_two(
    group1_data: &[f64],
    group2_data: &[f64],
    config: &SamplerConfig,
) -> Result<BestResultsTwo> {
    let model = BestModelTwo::new(group1_data, group2_data)?;
    run(model, config)
}

/// Analyze the distribution of a single group.
///
/// The effect size is computed relative to `ref_val`, which is the usual way
/// to analyze paired samples (analyze the differences against 0).
///
/// # Errors
///
/// Invalid observations, non-finite `ref_val`, or invalid sampler settings.
pub fn analyze_one(
    group_data: &[f64],
    ref_val: f64,
    config: &SamplerConfig,
) -> Result<BestResultsOne> {
    let model = BestModelOne::new(group_data, ref_val)?;
    run(model, config)
}

fn run<M: BestModel>(model: M, config: &SamplerConfig) -> Result<BestResults<M>> {
    let start = Instant::now();
    let (trace, report) = sample(&model, config)?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        converged = report.ok,
        "analysis finished"
    );
    Ok(BestResults::from_parts(model, trace, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BestError;

    #[test]
    fn test_analyze_rejects_bad_input() {
        let config = SamplerConfig::default().with_n_samples(10).with_tune(10);
        assert!(matches!(
            analyze_two(&[], &[1.0, 2.0], &config),
            Err(BestError::InvalidInput(_))
        ));
        assert!(analyze_one(&[1.0, f64::NAN], 0.0, &config).is_err());
        assert!(matches!(
            analyze_one(&[1.0, 2.0], 0.0, &config.clone().with_n_samples(0)),
            Err(BestError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_analyze_one_small_run() {
        let config = SamplerConfig::default()
            .with_n_samples(200)
            .with_tune(200)
            .with_chains(2)
            .with_seed(1)
            .with_max_rounds(1);
        let results = analyze_one(&[1.2, 0.8, 1.1, 0.9, 1.4, 1.0], 0.0, &config)
            .expect("analysis succeeds");
        assert_eq!(results.trace().len(), 400);
        assert!(results.posterior_prob("Mean", Some(0.0), None).expect("traced") > 0.95);
        assert_eq!(results.model().ref_val(), 0.0);
    }
}
