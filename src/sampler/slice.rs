//! Coordinate-wise slice sampling.
//!
//! Univariate slice sampler with stepping-out and shrinkage applied to each
//! coordinate in turn. Widths adapt during tuning to twice the running mean
//! of the absolute move size.
//!
//! Reference: Neal (2003), "Slice sampling", Annals of Statistics 31(3).

use crate::model::BestModel;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};

/// Cap on shrinkage steps for a single coordinate update.
const MAX_SHRINK_STEPS: usize = 200;

/// State of one chain.
#[derive(Debug, Clone)]
pub(crate) struct SliceChain {
    theta: Vec<f64>,
    log_p: f64,
    widths: Vec<f64>,
    n_tuned: usize,
    max_stepping_out: usize,
    /// Log-posterior evaluations so far
    pub(crate) n_evals: usize,
}

impl SliceChain {
    /// Start a chain near `model.initial_point()`, jittered by the chain RNG.
    pub(crate) fn new<M: BestModel + ?Sized>(
        model: &M,
        max_stepping_out: usize,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let widths = model.step_scales();
        let initial = model.initial_point();

        let jittered: Vec<f64> = initial
            .iter()
            .zip(&widths)
            .map(|(&x, &w)| {
                let z: f64 = StandardNormal.sample(rng);
                x + 0.1 * w * z
            })
            .collect();

        let jittered_log_p = model.log_posterior(&jittered);
        let (theta, log_p) = if jittered_log_p.is_finite() {
            (jittered, jittered_log_p)
        } else {
            let log_p = model.log_posterior(&initial);
            (initial, log_p)
        };

        Self {
            theta,
            log_p,
            widths,
            n_tuned: 0,
            max_stepping_out: max_stepping_out.max(1),
            n_evals: 2,
        }
    }

    /// Current parameter vector.
    pub(crate) fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Log-posterior at the current parameter vector.
    #[cfg(test)]
    pub(crate) fn log_p(&self) -> f64 {
        self.log_p
    }

    /// Update every coordinate once. With `tune` set, widths adapt.
    pub(crate) fn step<M: BestModel + ?Sized>(
        &mut self,
        model: &M,
        tune: bool,
        rng: &mut ChaCha8Rng,
    ) {
        for i in 0..self.theta.len() {
            let old = self.theta[i];
            self.update_coordinate(model, i, rng);

            if tune {
                let moved = 2.0 * (self.theta[i] - old).abs();
                let n = self.n_tuned as f64;
                let adapted = (self.widths[i] * (n + 1.0) + moved) / (n + 2.0);
                let floor = 1e-10 * (1.0 + self.theta[i].abs());
                self.widths[i] = adapted.max(floor);
            }
        }
        if tune {
            self.n_tuned += 1;
        }
    }

    fn update_coordinate<M: BestModel + ?Sized>(
        &mut self,
        model: &M,
        i: usize,
        rng: &mut ChaCha8Rng,
    ) {
        let x0 = self.theta[i];
        let w = self.widths[i];
        let exp_draw: f64 = Exp1.sample(rng);
        let log_y = self.log_p - exp_draw;

        let mut proposal = self.theta.clone();
        let mut log_p_at = |x: f64, evals: &mut usize| -> f64 {
            proposal[i] = x;
            *evals += 1;
            model.log_posterior(&proposal)
        };

        // Stepping out
        let mut left = x0 - w * rng.random::<f64>();
        let mut right = left + w;
        let steps = self.max_stepping_out;
        let mut j = (steps as f64 * rng.random::<f64>()).floor() as usize;
        let mut k = steps - 1 - j.min(steps - 1);
        while j > 0 && log_p_at(left, &mut self.n_evals) > log_y {
            left -= w;
            j -= 1;
        }
        while k > 0 && log_p_at(right, &mut self.n_evals) > log_y {
            right += w;
            k -= 1;
        }

        // Shrinkage
        for _ in 0..MAX_SHRINK_STEPS {
            let x1 = left + rng.random::<f64>() * (right - left);
            let log_p1 = log_p_at(x1, &mut self.n_evals);
            if log_p1 > log_y {
                self.theta[i] = x1;
                self.log_p = log_p1;
                return;
            }
            if x1 < x0 {
                left = x1;
            } else {
                right = x1;
            }
        }
        // Interval collapsed onto x0; keep the current value
        self.theta[i] = x0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BestModelOne, BestModelTwo};
    use crate::stats::{mean, std};
    use rand::SeedableRng;

    #[test]
    fn test_chain_starts_in_support() {
        let model = BestModelTwo::new(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).expect("valid data");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chain = SliceChain::new(&model, 32, &mut rng);
        assert!(chain.log_p().is_finite());
        assert_eq!(chain.theta().len(), 5);
    }

    #[test]
    fn test_steps_stay_in_support() {
        let model = BestModelTwo::new(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).expect("valid data");
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut chain = SliceChain::new(&model, 32, &mut rng);
        for iter in 0..300 {
            chain.step(&model, iter < 150, &mut rng);
            assert!(chain.log_p().is_finite());
            assert!(chain.theta()[2] >= 0.0, "nu offset must stay non-negative");
            assert!((model.log_posterior(chain.theta()) - chain.log_p()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_recovers_group_mean() {
        let data: Vec<f64> = (0..40).map(|i| 10.0 + f64::from(i % 9) * 0.25).collect();
        let model = BestModelOne::new(&data, 0.0).expect("valid data");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut chain = SliceChain::new(&model, 32, &mut rng);
        for _ in 0..500 {
            chain.step(&model, true, &mut rng);
        }
        let draws: Vec<f64> = (0..1500)
            .map(|_| {
                chain.step(&model, false, &mut rng);
                chain.theta()[0]
            })
            .collect();
        let posterior_mean = mean(&draws);
        assert!(
            (posterior_mean - mean(&data)).abs() < 0.15,
            "posterior mean {posterior_mean} vs sample mean {}",
            mean(&data)
        );
        // Posterior sd of the mean is roughly sd / sqrt(n)
        assert!(std(&draws) < std(&data));
    }
}
