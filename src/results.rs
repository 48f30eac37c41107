//! Results of a BEST analysis.
//!
//! [`BestResults`] pairs a model with its posterior samples and answers the
//! usual questions about them: credible intervals, posterior probabilities of
//! intervals, posterior modes, and a per-variable summary table.

use crate::diagnostics::{ess, mcse_mean, split_rhat, SampleReport};
use crate::error::{BestError, Result};
use crate::model::{BestModel, BestModelOne, BestModelTwo};
use crate::stats::hdi::validate_credible_mass;
use crate::stats::{hdi, kde_mode, mean, variance};
use crate::trace::Trace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Results of an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestResults<M> {
    model: M,
    trace: Trace,
    report: SampleReport,
}

/// Results of a one-group analysis.
pub type BestResultsOne = BestResults<BestModelOne>;

/// Results of a two-group analysis.
pub type BestResultsTwo = BestResults<BestModelTwo>;

impl<M: BestModel> BestResults<M> {
    /// Wrap posterior samples obtained elsewhere.
    ///
    /// The convergence report is computed from the trace.
    #[must_use]
    pub fn new(model: M, trace: Trace) -> Self {
        let report = SampleReport::from_trace(&trace, model.free_parameter_names());
        Self::from_parts(model, trace, report)
    }

    /// Assemble results from sampler output.
    #[must_use]
    pub fn from_parts(model: M, trace: Trace, report: SampleReport) -> Self {
        Self {
            model,
            trace,
            report,
        }
    }

    /// The model the samples were drawn from
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The collection of posterior samples
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Convergence report of the sampling run
    pub fn report(&self) -> &SampleReport {
        &self.report
    }

    /// Observed data of a group.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidGroup`] for an ID the model does not have.
    pub fn observed_data(&self, group_id: usize) -> Result<&[f64]> {
        self.model.observed_data(group_id)
    }

    /// Highest posterior density interval of a variable.
    ///
    /// The interval covers `credible_mass * 100%` of the posterior samples;
    /// 0.95 gives the customary 95% HDI.
    ///
    /// # Errors
    ///
    /// Unknown variable, or `credible_mass` outside (0, 1].
    pub fn hdi(&self, var_name: &str, credible_mass: f64) -> Result<(f64, f64)> {
        validate_credible_mass(credible_mass)?;
        hdi(self.trace.get(var_name)?, credible_mass)
    }

    /// Posterior probability that `low < var < high`.
    ///
    /// `None` leaves that side of the interval open. If `p` is the result and
    /// `S` the number of samples, the Monte Carlo error of `p` is about
    /// `sqrt(p (1 - p) / S)`; for 2000 samples that is ±0.011 at `p = 0.5`.
    ///
    /// ```
    /// use best::model::BestModelTwo;
    /// use best::results::BestResults;
    /// use best::trace::Trace;
    ///
    /// let model = BestModelTwo::new(&[1.0, 2.0], &[3.0, 5.0]).unwrap();
    /// let trace = Trace::from_samples(vec![
    ///     ("Difference of means".to_string(), vec![-1.0, 0.5, 1.5, 2.0]),
    /// ])
    /// .unwrap();
    /// let results = BestResults::new(model, trace);
    /// let p = results.posterior_prob("Difference of means", Some(0.0), None).unwrap();
    /// assert_eq!(p, 0.75);
    /// ```
    ///
    /// # Errors
    ///
    /// Unknown variable or empty trace.
    pub fn posterior_prob(
        &self,
        var_name: &str,
        low: Option<f64>,
        high: Option<f64>,
    ) -> Result<f64> {
        let samples = self.trace.get(var_name)?;
        if samples.is_empty() {
            return Err(BestError::empty_input("posterior samples"));
        }
        let low = low.unwrap_or(f64::NEG_INFINITY);
        let high = high.unwrap_or(f64::INFINITY);

        let n_match = samples.iter().filter(|&&x| low < x && x < high).count();
        Ok(n_match as f64 / samples.len() as f64)
    }

    /// Posterior mode of a variable, located with a Gaussian kernel density
    /// estimate evaluated on a 512-point grid.
    ///
    /// # Errors
    ///
    /// Unknown variable or empty trace.
    pub fn posterior_mode(&self, var_name: &str) -> Result<f64> {
        kde_mode(self.trace.get(var_name)?)
    }

    /// Summary statistics of every traced variable.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::InvalidHyperparameter`] for `credible_mass`
    /// outside (0, 1].
    pub fn summary(&self, credible_mass: f64) -> Result<Summary> {
        validate_credible_mass(credible_mass)?;

        let rows = self
            .trace
            .names()
            .map(|name| {
                let samples = self.trace.get(name)?;
                let chains = self.trace.chains(name)?;
                let (hdi_low, hdi_high) = hdi(samples, credible_mass)?;
                Ok(SummaryRow {
                    variable: name.to_string(),
                    mean: mean(samples),
                    sd: variance(samples, 0).sqrt(),
                    hdi_low,
                    hdi_high,
                    mcse_mean: mcse_mean(&chains),
                    ess: ess(&chains),
                    r_hat: split_rhat(&chains),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Summary {
            credible_mass,
            rows,
        })
    }
}

impl<M: BestModel + Serialize> BestResults<M> {
    /// Write the results (model, samples and report) as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl<M: BestModel + DeserializeOwned> BestResults<M> {
    /// Read results written by [`BestResults::save_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds other data.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Summary statistics of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Variable name
    pub variable: String,
    /// Posterior mean
    pub mean: f64,
    /// Posterior standard deviation
    pub sd: f64,
    /// Lower end of the HDI
    pub hdi_low: f64,
    /// Upper end of the HDI
    pub hdi_high: f64,
    /// Monte Carlo standard error of the mean
    pub mcse_mean: f64,
    /// Effective sample size
    pub ess: f64,
    /// Split R-hat
    pub r_hat: f64,
}

/// Per-variable summary of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Mass covered by the HDI columns
    pub credible_mass: f64,
    /// One row per traced variable
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Row of a variable, if traced.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.variable == variable)
    }

    /// Column labels of the HDI endpoints, e.g. `hdi_2.5%` and `hdi_97.5%`.
    #[must_use]
    pub fn hdi_labels(&self) -> (String, String) {
        let tail = (1.0 - self.credible_mass) / 2.0 * 100.0;
        let fmt = |p: f64| {
            let s = format!("{p:.2}");
            let s = s.trim_end_matches('0').trim_end_matches('.');
            format!("hdi_{s}%")
        };
        (fmt(tail), fmt(100.0 - tail))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|row| row.variable.chars().count())
            .max()
            .unwrap_or(0);
        let (low_label, high_label) = self.hdi_labels();

        writeln!(
            f,
            "{:<width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>9}  {:>8}  {:>6}",
            "", "mean", "sd", low_label, high_label, "mcse_mean", "ess", "r_hat"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<width$}  {:>10.3}  {:>10.3}  {:>10.3}  {:>10.3}  {:>9.3}  {:>8.0}  {:>6.2}",
                row.variable,
                row.mean,
                row.sd,
                row.hdi_low,
                row.hdi_high,
                row.mcse_mean,
                row.ess,
                row.r_hat
            )?;
        }
        Ok(())
    }
}
