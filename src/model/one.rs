//! Single-group model.

use super::{format_exp, format_g, t_sd, BestModel, ModelKind, Priors};
use crate::distributions::{
    exponential_ln_pdf, normal_ln_pdf, student_t_ln_likelihood, uniform_ln_pdf,
};
use crate::error::{BestError, Result};
use crate::stats::mean;
use serde::{Deserialize, Serialize};
use std::fmt;

const FREE_PARAMETERS: &[&str] = &["Mean", "nu - 2.5", "Log sigma"];

const TRACE_NAMES: &[&str] = &[
    "Mean",
    "nu - 2.5",
    "Log sigma",
    "Normality",
    "Sigma",
    "SD",
    "Effect size",
];

/// Model for a single-group analysis.
///
/// Typically used to compare observations against a reference value such as
/// zero, e.g. for paired data or an experiment without a control group.
/// The effect size is `(μ − ref_val) / SD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModelOne {
    y: Vec<f64>,
    ref_val: f64,
    priors: Priors,
}

impl BestModelOne {
    /// Build the model from the observations and a reference value.
    ///
    /// # Errors
    ///
    /// Empty data, non-finite values, zero spread, or a non-finite `ref_val`.
    pub fn new(y: &[f64], ref_val: f64) -> Result<Self> {
        if !ref_val.is_finite() {
            return Err(BestError::InvalidInput(format!(
                "reference value must be finite, got {ref_val}"
            )));
        }
        let priors = Priors::from_data(y)?;
        Ok(Self {
            y: y.to_vec(),
            ref_val,
            priors,
        })
    }

    /// Reference value the mean is compared against.
    #[must_use]
    pub fn ref_val(&self) -> f64 {
        self.ref_val
    }
}

impl BestModel for BestModelOne {
    fn kind(&self) -> ModelKind {
        ModelKind::OneGroup {
            ref_val: self.ref_val,
        }
    }

    fn priors(&self) -> &Priors {
        &self.priors
    }

    fn observed_data(&self, group_id: usize) -> Result<&[f64]> {
        if group_id == 1 {
            Ok(&self.y)
        } else {
            Err(BestError::InvalidGroup {
                group_id,
                allowed: "1",
            })
        }
    }

    fn free_parameter_names(&self) -> &'static [&'static str] {
        FREE_PARAMETERS
    }

    fn initial_point(&self) -> Vec<f64> {
        vec![
            mean(&self.y),
            self.priors.nu_param(),
            self.priors.initial_log_sigma(&self.y),
        ]
    }

    fn step_scales(&self) -> Vec<f64> {
        vec![self.priors.data_scale(), self.priors.nu_param(), 1.0]
    }

    fn log_posterior(&self, theta: &[f64]) -> f64 {
        let &[mu, nu_offset, log_sigma] = theta else {
            return f64::NEG_INFINITY;
        };
        let p = &self.priors;
        let (low, high) = p.log_sigma_bounds();

        let prior =
            exponential_ln_pdf(nu_offset, p.nu_rate()) + uniform_ln_pdf(log_sigma, low, high);
        if !prior.is_finite() {
            return f64::NEG_INFINITY;
        }

        let nu = nu_offset + p.nu_min;
        let lambda = (-2.0 * log_sigma).exp();

        prior
            + normal_ln_pdf(mu, p.mu_loc, p.mu_scale)
            + student_t_ln_likelihood(&self.y, nu, mu, lambda)
    }

    fn trace_names(&self) -> &'static [&'static str] {
        TRACE_NAMES
    }

    fn trace_point(&self, theta: &[f64]) -> Vec<f64> {
        let (mu, nu_offset, log_sigma) = (theta[0], theta[1], theta[2]);
        let nu = nu_offset + self.priors.nu_min;
        let sigma = log_sigma.exp();
        let sd = t_sd(sigma, nu);

        vec![
            mu,
            nu_offset,
            log_sigma,
            nu,
            sigma,
            sd,
            (mu - self.ref_val) / sd,
        ]
    }
}

impl fmt::Display for BestModelOne {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.priors;
        writeln!(
            f,
            "μ ~ Normal({}, {})",
            format_exp(p.mu_loc, 2),
            format_exp(p.mu_scale, 2)
        )?;
        writeln!(
            f,
            "log(σ) ~ Uniform(log({}), log({}))",
            format_g(p.sigma_low),
            format_g(p.sigma_high)
        )?;
        writeln!(
            f,
            "ν ~ Exponential(1/{}) + {}",
            format_g(p.nu_param()),
            format_g(p.nu_min)
        )?;
        writeln!(f, "y ~ t(ν, μ, σ)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BestModelOne {
        BestModelOne::new(&[0.5, 0.3, 0.7, 0.9, 0.1, 0.6], 0.0).expect("valid data")
    }

    #[test]
    fn test_observed_data() {
        let m = model();
        assert_eq!(m.observed_data(1).expect("group 1").len(), 6);
        let err = m.observed_data(2).unwrap_err();
        assert!(err.to_string().contains("must be 1"));
    }

    #[test]
    fn test_kind_carries_ref_val() {
        let m = BestModelOne::new(&[1.0, 2.0], 1.5).expect("valid data");
        assert_eq!(m.kind(), ModelKind::OneGroup { ref_val: 1.5 });
        assert!((m.ref_val() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_initial_point_is_in_support() {
        let m = model();
        assert!(m.log_posterior(&m.initial_point()).is_finite());
    }

    #[test]
    fn test_log_posterior_wrong_arity() {
        assert_eq!(model().log_posterior(&[0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_effect_size_uses_ref_val() {
        let m = BestModelOne::new(&[1.0, 2.0, 3.0], 1.0).expect("valid data");
        // nu = 1e6 + 2.5 so SD ~= sigma = 1
        let point = m.trace_point(&[3.0, 1e6, 0.0]);
        let effect = point[6];
        assert!((effect - 2.0).abs() < 1e-5);
        assert!((point[3] - (1e6 + 2.5)).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        let text = model().to_string();
        assert!(text.starts_with("μ ~ Normal(5.17e-01, 2.61e+02)\n"), "{text}");
        assert!(text.contains("ν ~ Exponential(1/27.5) + 2.5"));
        assert!(text.ends_with("y ~ t(ν, μ, σ)\n"));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(BestModelOne::new(&[], 0.0).is_err());
        assert!(BestModelOne::new(&[1.0, 2.0], f64::NAN).is_err());
        assert!(BestModelOne::new(&[1.0, 1.0], 0.0).is_err());
    }
}
