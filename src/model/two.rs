//! Two-group model.

use super::{format_g, t_sd, BestModel, ModelKind, Priors};
use crate::distributions::{
    exponential_ln_pdf, normal_ln_pdf, student_t_ln_likelihood, uniform_ln_pdf,
};
use crate::error::{BestError, Result};
use crate::stats::mean;
use serde::{Deserialize, Serialize};
use std::fmt;

const FREE_PARAMETERS: &[&str] = &[
    "Group 1 mean",
    "Group 2 mean",
    "nu - 2.5",
    "Group 1 log sigma",
    "Group 2 log sigma",
];

const TRACE_NAMES: &[&str] = &[
    "Group 1 mean",
    "Group 2 mean",
    "nu - 2.5",
    "Group 1 log sigma",
    "Group 2 log sigma",
    "Normality",
    "Group 1 sigma",
    "Group 2 sigma",
    "Group 1 SD",
    "Group 2 SD",
    "Difference of means",
    "Difference of SDs",
    "Effect size",
];

/// Model for a two-group analysis.
///
/// ```text
/// μ1, μ2         ~ Normal(mu_loc, mu_scale)
/// log σ1, log σ2 ~ Uniform(log sigma_low, log sigma_high)
/// ν − 2.5        ~ Exponential(1/27.5)
/// y1 ~ t(ν, μ1, σ1),  y2 ~ t(ν, μ2, σ2)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModelTwo {
    y1: Vec<f64>,
    y2: Vec<f64>,
    priors: Priors,
}

impl BestModelTwo {
    /// Build the model from the observations of both groups.
    ///
    /// # Errors
    ///
    /// Either group empty, any value non-finite, or no spread in the pooled data.
    pub fn new(y1: &[f64], y2: &[f64]) -> Result<Self> {
        if y1.is_empty() || y2.is_empty() {
            return Err(BestError::InvalidInput(
                "both groups need at least one observation".into(),
            ));
        }
        let y_all: Vec<f64> = y1.iter().chain(y2).copied().collect();
        let priors = Priors::from_data(&y_all)?;

        Ok(Self {
            y1: y1.to_vec(),
            y2: y2.to_vec(),
            priors,
        })
    }
}

impl BestModel for BestModelTwo {
    fn kind(&self) -> ModelKind {
        ModelKind::TwoGroup
    }

    fn priors(&self) -> &Priors {
        &self.priors
    }

    fn observed_data(&self, group_id: usize) -> Result<&[f64]> {
        match group_id {
            1 => Ok(&self.y1),
            2 => Ok(&self.y2),
            _ => Err(BestError::InvalidGroup {
                group_id,
                allowed: "1 or 2",
            }),
        }
    }

    fn free_parameter_names(&self) -> &'static [&'static str] {
        FREE_PARAMETERS
    }

    fn initial_point(&self) -> Vec<f64> {
        vec![
            mean(&self.y1),
            mean(&self.y2),
            self.priors.nu_param(),
            self.priors.initial_log_sigma(&self.y1),
            self.priors.initial_log_sigma(&self.y2),
        ]
    }

    fn step_scales(&self) -> Vec<f64> {
        let scale = self.priors.data_scale();
        vec![scale, scale, self.priors.nu_param(), 1.0, 1.0]
    }

    fn log_posterior(&self, theta: &[f64]) -> f64 {
        let &[mu1, mu2, nu_offset, log_sigma1, log_sigma2] = theta else {
            return f64::NEG_INFINITY;
        };
        let p = &self.priors;
        let (low, high) = p.log_sigma_bounds();

        let prior = exponential_ln_pdf(nu_offset, p.nu_rate())
            + uniform_ln_pdf(log_sigma1, low, high)
            + uniform_ln_pdf(log_sigma2, low, high);
        if !prior.is_finite() {
            return f64::NEG_INFINITY;
        }

        let nu = nu_offset + p.nu_min;
        let lambda1 = (-2.0 * log_sigma1).exp();
        let lambda2 = (-2.0 * log_sigma2).exp();

        prior
            + normal_ln_pdf(mu1, p.mu_loc, p.mu_scale)
            + normal_ln_pdf(mu2, p.mu_loc, p.mu_scale)
            + student_t_ln_likelihood(&self.y1, nu, mu1, lambda1)
            + student_t_ln_likelihood(&self.y2, nu, mu2, lambda2)
    }

    fn trace_names(&self) -> &'static [&'static str] {
        TRACE_NAMES
    }

    fn trace_point(&self, theta: &[f64]) -> Vec<f64> {
        let (mu1, mu2, nu_offset, log_sigma1, log_sigma2) =
            (theta[0], theta[1], theta[2], theta[3], theta[4]);
        let nu = nu_offset + self.priors.nu_min;
        let sigma1 = log_sigma1.exp();
        let sigma2 = log_sigma2.exp();
        let sd1 = t_sd(sigma1, nu);
        let sd2 = t_sd(sigma2, nu);
        let diff_of_means = mu1 - mu2;

        vec![
            mu1,
            mu2,
            nu_offset,
            log_sigma1,
            log_sigma2,
            nu,
            sigma1,
            sigma2,
            sd1,
            sd2,
            diff_of_means,
            sd1 - sd2,
            diff_of_means / ((sd1.powi(2) + sd2.powi(2)) / 2.0).sqrt(),
        ]
    }
}

impl fmt::Display for BestModelTwo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.priors;
        let (loc, scale) = (format_g(p.mu_loc), format_g(p.mu_scale));
        let (low, high) = (format_g(p.sigma_low), format_g(p.sigma_high));
        writeln!(f, "μ1 ~ Normal({loc}, {scale})")?;
        writeln!(f, "μ2 ~ Normal({loc}, {scale})")?;
        writeln!(f, "log(σ1) ~ Uniform(log({low}), log({high}))")?;
        writeln!(f, "log(σ2) ~ Uniform(log({low}), log({high}))")?;
        writeln!(
            f,
            "ν ~ Exponential(1/{}) + {}",
            format_g(p.nu_param()),
            format_g(p.nu_min)
        )?;
        writeln!(f, "y1 ~ t(ν, μ1, σ1)")?;
        writeln!(f, "y2 ~ t(ν, μ2, σ2)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BestModelTwo {
        BestModelTwo::new(&[1.0, 2.0, 3.0, 4.0], &[2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid data")
    }

    #[test]
    fn test_observed_data() {
        let m = model();
        assert_eq!(m.observed_data(1).expect("group 1"), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.observed_data(2).expect("group 2").len(), 5);
        let err = m.observed_data(3).unwrap_err();
        assert!(err.to_string().contains("must be 1 or 2"));
        assert!(m.observed_data(0).is_err());
    }

    #[test]
    fn test_priors_use_pooled_data() {
        let m = model();
        let pooled = [1.0, 2.0, 3.0, 4.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!((m.priors().mu_loc - mean(&pooled)).abs() < 1e-12);
    }

    #[test]
    fn test_initial_point_is_in_support() {
        let m = model();
        let theta = m.initial_point();
        assert_eq!(theta.len(), m.free_parameter_names().len());
        assert!(m.log_posterior(&theta).is_finite());
    }

    #[test]
    fn test_log_posterior_outside_support() {
        let m = model();
        let mut theta = m.initial_point();
        theta[2] = -0.1;
        assert_eq!(m.log_posterior(&theta), f64::NEG_INFINITY);

        let mut theta = m.initial_point();
        theta[3] = m.priors().log_sigma_bounds().1 + 1.0;
        assert_eq!(m.log_posterior(&theta), f64::NEG_INFINITY);

        assert_eq!(m.log_posterior(&[0.0, 1.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_posterior_prefers_group_means() {
        let m = model();
        let good = m.initial_point();
        let mut bad = good.clone();
        bad[0] += 10.0;
        assert!(m.log_posterior(&good) > m.log_posterior(&bad));
    }

    #[test]
    fn test_trace_point_derived_quantities() {
        let m = model();
        let theta = [2.0, 1.0, 2.0, 0.0, 2.0_f64.ln()];
        let point = m.trace_point(&theta);
        assert_eq!(point.len(), m.trace_names().len());

        let get = |name: &str| {
            let idx = TRACE_NAMES
                .iter()
                .position(|n| *n == name)
                .expect("known name");
            point[idx]
        };
        // nu = 4.5, sd factor sqrt(4.5 / 2.5)
        let factor = (4.5_f64 / 2.5).sqrt();
        assert!((get("Normality") - 4.5).abs() < 1e-12);
        assert!((get("Group 1 sigma") - 1.0).abs() < 1e-12);
        assert!((get("Group 2 SD") - 2.0 * factor).abs() < 1e-12);
        assert!((get("Difference of means") - 1.0).abs() < 1e-12);
        assert!((get("Difference of SDs") + factor).abs() < 1e-12);
        let pooled = ((factor.powi(2) + 4.0 * factor.powi(2)) / 2.0).sqrt();
        assert!((get("Effect size") - 1.0 / pooled).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let text = model().to_string();
        assert!(text.starts_with("μ1 ~ Normal("));
        assert!(text.contains("ν ~ Exponential(1/27.5) + 2.5"));
        assert!(text.contains("y2 ~ t(ν, μ2, σ2)"));
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn test_rejects_empty_group() {
        assert!(BestModelTwo::new(&[], &[1.0, 2.0]).is_err());
        assert!(BestModelTwo::new(&[1.0, 2.0], &[]).is_err());
    }

    #[test]
    fn test_version() {
        assert_eq!(model().version(), "v2");
        assert_eq!(model().kind(), ModelKind::TwoGroup);
    }
}
