//! BEST models for one and two groups.
//!
//! Implements the robust Bayesian estimation model of Kruschke (2012),
//! "Bayesian estimation supersedes the t test". Each group is described by a
//! Student-t distribution with its own mean and scale; both groups share the
//! normality parameter ν. The broad priors are derived from the pooled data
//! so that the model is invariant to the units of measurement.
//!
//! A model only defines the (unnormalised) log-posterior over its free
//! parameters and how to derive the traced quantities from a parameter
//! vector. Drawing samples is the job of [`crate::sampler`].
//!
//! # Example
//!
//! ```
//! use best::model::{BestModel, BestModelTwo};
//!
//! let model = BestModelTwo::new(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(model.version(), "v2");
//! assert!(model.log_posterior(&model.initial_point()).is_finite());
//! ```

mod one;
mod two;

pub use one::BestModelOne;
pub use two::BestModelTwo;

use crate::error::{BestError, Result};
use crate::stats::{mean, std};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the model definition.
pub const MODEL_VERSION: &str = "v2";

/// Lower bound of the normality parameter ν.
pub const NU_MIN: f64 = 2.5;

/// Prior mean of ν.
pub const NU_MEAN: f64 = 30.0;

/// Which analysis a model performs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Single group compared against a reference value.
    OneGroup {
        /// Reference value for the mean and the effect size
        ref_val: f64,
    },
    /// Two independent groups.
    TwoGroup,
}

/// Hyperparameters of the broad priors, derived from the pooled data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    /// Location of the Normal prior on the means
    pub mu_loc: f64,
    /// Scale of the Normal prior on the means
    pub mu_scale: f64,
    /// Lower bound of σ (the Uniform prior is on log σ)
    pub sigma_low: f64,
    /// Upper bound of σ
    pub sigma_high: f64,
    /// Shift of the exponential prior on ν
    pub nu_min: f64,
    /// Prior mean of ν
    pub nu_mean: f64,
}

impl Priors {
    /// Derive priors from all observations of all groups.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidInput`] if the data is empty, contains a
    /// non-finite value, or has no spread.
    pub fn from_data(y_all: &[f64]) -> Result<Self> {
        if y_all.is_empty() {
            return Err(BestError::InvalidInput(
                "cannot build a model without observations".into(),
            ));
        }
        if let Some(bad) = y_all.iter().find(|x| !x.is_finite()) {
            return Err(BestError::InvalidInput(format!(
                "observations must be finite, got {bad}"
            )));
        }

        let spread = std(y_all);
        if spread <= 0.0 {
            return Err(BestError::InvalidInput(
                "observations have zero standard deviation; priors would be degenerate".into(),
            ));
        }

        Ok(Self {
            mu_loc: mean(y_all),
            mu_scale: spread * 1000.0,
            sigma_low: spread / 1000.0,
            sigma_high: spread * 1000.0,
            nu_min: NU_MIN,
            nu_mean: NU_MEAN,
        })
    }

    /// Rate of the exponential prior on ν − `nu_min`.
    #[must_use]
    pub fn nu_rate(&self) -> f64 {
        1.0 / self.nu_param()
    }

    /// Mean of the exponential prior on ν − `nu_min`.
    #[must_use]
    pub fn nu_param(&self) -> f64 {
        self.nu_mean - self.nu_min
    }

    /// Bounds of the Uniform prior on log σ.
    #[must_use]
    pub fn log_sigma_bounds(&self) -> (f64, f64) {
        (self.sigma_low.ln(), self.sigma_high.ln())
    }

    /// Standard deviation of the pooled data the priors were built from.
    #[must_use]
    pub fn data_scale(&self) -> f64 {
        (self.sigma_low * self.sigma_high).sqrt()
    }

    /// Starting value for a group's log σ, kept strictly inside the prior bounds.
    pub(crate) fn initial_log_sigma(&self, group: &[f64]) -> f64 {
        let (low, high) = self.log_sigma_bounds();
        let margin = (high - low) * 1e-3;
        let spread = std(group);
        let guess = if spread > 0.0 {
            spread.ln()
        } else {
            // Constant group: start from the pooled scale
            self.data_scale().ln()
        };
        guess.clamp(low + margin, high - margin)
    }
}

/// Base trait for BEST models.
pub trait BestModel: fmt::Display + Send + Sync {
    /// Version of the model definition
    fn version(&self) -> &'static str {
        MODEL_VERSION
    }

    /// One- or two-group analysis
    fn kind(&self) -> ModelKind;

    /// Prior hyperparameters
    fn priors(&self) -> &Priors;

    /// Observed data of a group (IDs start at 1).
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidGroup`] for an ID the model does not have.
    fn observed_data(&self, group_id: usize) -> Result<&[f64]>;

    /// Names of the free parameters, in the order of the parameter vector
    fn free_parameter_names(&self) -> &'static [&'static str];

    /// A point in the support of the posterior to start chains from
    fn initial_point(&self) -> Vec<f64>;

    /// Typical scale of each free parameter; initial slice widths
    fn step_scales(&self) -> Vec<f64>;

    /// Unnormalised log-posterior; `-inf` outside the support
    fn log_posterior(&self, theta: &[f64]) -> f64;

    /// Names of all traced variables: the free parameters first, then the
    /// derived quantities
    fn trace_names(&self) -> &'static [&'static str];

    /// Values of all traced variables at `theta`, ordered as [`Self::trace_names`]
    fn trace_point(&self, theta: &[f64]) -> Vec<f64>;
}

/// SD of a Student-t with scale `sigma` and `nu` degrees of freedom.
pub(crate) fn t_sd(sigma: f64, nu: f64) -> f64 {
    sigma * (nu / (nu - 2.0)).sqrt()
}

/// Compact float formatting for the prior description: six significant
/// digits, scientific notation for very large or small magnitudes.
pub(crate) fn format_g(x: f64) -> String {
    format_significant(x, 6)
}

/// Format `x` with `digits` significant digits, dropping trailing zeros.
///
/// Magnitudes below 1e-4 or at least `10^digits` (after rounding) use
/// scientific notation with a signed, two-digit exponent, e.g. `1.41421e+06`.
pub(crate) fn format_significant(x: f64, digits: usize) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{x}");
    }
    let digits = digits.max(1);
    let precision = digits - 1;
    let sci = format!("{x:.precision$e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exp.parse().unwrap_or(0);

    if (-4..digits as i32).contains(&exponent) {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    } else {
        format!("{}{}", trim_fraction(mantissa), exponent_suffix(exp))
    }
}

/// Scientific notation with `precision` fraction digits, e.g. `1.00e+06`.
pub(crate) fn format_exp(x: f64, precision: usize) -> String {
    let sci = format!("{x:.precision$e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => format!("{mantissa}{}", exponent_suffix(exp)),
        None => sci,
    }
}

fn exponent_suffix(exp: &str) -> String {
    let (sign, magnitude) = match exp.strip_prefix('-') {
        Some(magnitude) => ('-', magnitude),
        None => ('+', exp),
    };
    format!("e{sign}{magnitude:0>2}")
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
