//! Posterior sampling for BEST models.
//!
//! Runs several independent slice-sampling chains in parallel (one rayon task
//! per chain), collects the traced quantities and checks convergence. A run
//! that fails the convergence checks is repeated with a longer tuning phase,
//! up to [`SamplerConfig::max_rounds`] times.
//!
//! # Example
//!
//! ```no_run
//! use best::model::BestModelTwo;
//! use best::sampler::{sample, SamplerConfig};
//!
//! let model = BestModelTwo::new(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
//! let config = SamplerConfig::default().with_n_samples(500).with_seed(7);
//! let (trace, report) = sample(&model, &config).unwrap();
//! assert_eq!(trace.n_draws(), 500);
//! println!("converged: {}", report.ok);
//! ```

mod slice;

use crate::diagnostics::SampleReport;
use crate::error::{BestError, Result};
use crate::model::BestModel;
use crate::trace::Trace;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slice::SliceChain;
use tracing::{debug, info, warn};

/// Sampler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Draws kept per chain
    pub n_samples: usize,
    /// Tuning iterations per chain in the first round (discarded)
    pub tune: usize,
    /// Number of chains; `None` picks from the rayon thread count
    pub chains: Option<usize>,
    /// Base seed; `None` draws one from the thread RNG
    pub seed: Option<u64>,
    /// Maximum number of sampling rounds
    pub max_rounds: usize,
    /// Tuning iterations for every round after the first
    pub retry_tune: usize,
    /// Maximum number of stepping-out steps per coordinate update
    pub max_stepping_out: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            n_samples: 2000,
            tune: 1000,
            chains: None,
            seed: None,
            max_rounds: 2,
            retry_tune: 2000,
            max_stepping_out: 32,
        }
    }
}

impl SamplerConfig {
    /// Set the number of kept draws per chain
    #[must_use]
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    /// Set the number of tuning iterations
    #[must_use]
    pub fn with_tune(mut self, n: usize) -> Self {
        self.tune = n;
        self
    }

    /// Set the number of chains
    #[must_use]
    pub fn with_chains(mut self, n: usize) -> Self {
        self.chains = Some(n);
        self
    }

    /// Set the base seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the maximum number of sampling rounds
    #[must_use]
    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
        self
    }

    /// Set the tuning length used by repeated rounds
    #[must_use]
    pub fn with_retry_tune(mut self, n: usize) -> Self {
        self.retry_tune = n;
        self
    }

    /// Set the stepping-out limit of the slice sampler
    #[must_use]
    pub fn with_max_stepping_out(mut self, n: usize) -> Self {
        self.max_stepping_out = n;
        self
    }

    /// Number of chains that will actually run.
    #[must_use]
    pub fn effective_chains(&self) -> usize {
        self.chains
            .unwrap_or_else(|| rayon::current_num_threads().clamp(2, 4))
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidHyperparameter`] for zero draws, chains,
    /// rounds, or stepping-out steps.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("n_samples", self.n_samples),
            ("chains", self.effective_chains()),
            ("max_rounds", self.max_rounds),
            ("max_stepping_out", self.max_stepping_out),
        ];
        for (param, value) in checks {
            if value == 0 {
                return Err(BestError::InvalidHyperparameter {
                    param: param.to_string(),
                    value: value.to_string(),
                    constraint: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Draw posterior samples of every traced variable of `model`.
///
/// Chains are reproducible: with a fixed seed, chain `c` of round `r` always
/// uses the same random stream regardless of thread scheduling. If the
/// convergence checks (split R-hat and ESS of the free parameters) fail, the
/// run is repeated with [`SamplerConfig::retry_tune`] tuning iterations. The
/// last round is returned together with its report, converged or not.
///
/// # Errors
///
/// Returns an error for invalid settings.
pub fn sample<M: BestModel + ?Sized>(
    model: &M,
    config: &SamplerConfig,
) -> Result<(Trace, SampleReport)> {
    config.validate()?;
    let n_chains = config.effective_chains();
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);

    info!(
        chains = n_chains,
        draws = config.n_samples,
        tune = config.tune,
        seed,
        "sampling posterior"
    );

    let mut round = 0;
    loop {
        let tune = if round == 0 {
            config.tune
        } else {
            config.retry_tune
        };
        let round_seed = seed.wrapping_add((round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        let chains: Vec<Vec<Vec<f64>>> = (0..n_chains)
            .into_par_iter()
            .map(|chain_id| run_chain(model, config, tune, round_seed, chain_id))
            .collect();

        let trace = Trace::from_chain_points(model.trace_names(), &chains)?;
        let mut report = SampleReport::from_trace(&trace, model.free_parameter_names());
        debug!(
            round,
            max_rhat = ?report.max_rhat,
            min_ess = ?report.min_ess,
            "round finished"
        );

        round += 1;
        report.rounds = round;
        if report.ok || round >= config.max_rounds {
            for message in &report.warnings {
                warn!("{message}");
            }
            if !report.ok {
                warn!(
                    rounds = round,
                    "samples may still be unreliable; try rerunning the analysis"
                );
            }
            return Ok((trace, report));
        }

        warn!(
            round,
            retry_tune = config.retry_tune,
            "chains did not converge; sampling again with longer tuning"
        );
    }
}

fn run_chain<M: BestModel + ?Sized>(
    model: &M,
    config: &SamplerConfig,
    tune: usize,
    seed: u64,
    chain_id: usize,
) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chain_id as u64);

    let mut chain = SliceChain::new(model, config.max_stepping_out, &mut rng);
    for _ in 0..tune {
        chain.step(model, true, &mut rng);
    }

    let draws = (0..config.n_samples)
        .map(|_| {
            chain.step(model, false, &mut rng);
            model.trace_point(chain.theta())
        })
        .collect();

    debug!(chain = chain_id, evaluations = chain.n_evals, "chain finished");
    draws
}
