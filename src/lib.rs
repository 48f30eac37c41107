//! BEST: Bayesian estimation supersedes the t-test.
//!
//! Robust Bayesian estimation of the means, standard deviations and
//! normality of one or two groups of observations, following Kruschke
//! (2012). Instead of a single p-value, the analysis yields the full
//! posterior distribution of every parameter, including the difference of
//! means and the effect size, together with highest density intervals.
//!
//! # Quick Start
//!
//! ```no_run
//! use best::prelude::*;
//!
//! let drug = [101.0, 100.0, 102.0, 104.0, 102.0, 97.0, 105.0, 105.0, 98.0, 101.0];
//! let placebo = [99.0, 101.0, 100.0, 101.0, 102.0, 100.0, 97.0, 101.0, 104.0, 101.0];
//!
//! let results = analyze_two(&drug, &placebo, &SamplerConfig::default()).unwrap();
//!
//! let p = results.posterior_prob("Difference of means", Some(0.0), None).unwrap();
//! let (low, high) = results.hdi("Difference of means", 0.95).unwrap();
//! println!("P(drug > placebo) = {p:.3}, 95% HDI ({low:.2}, {high:.2})");
//!
//! plot_all(&results).unwrap().savefig("drug_placebo.svg").unwrap();
//! ```
//!
//! # Modules
//!
//! - [`model`]: The one- and two-group models and their priors
//! - [`sampler`]: Multi-chain slice sampling of the posterior
//! - [`diagnostics`]: Split R-hat, effective sample size, MCSE
//! - [`results`]: Posterior queries (HDI, interval probabilities, modes, summaries)
//! - [`analyze`]: One-call analyses
//! - [`plot`]: Posterior and posterior-predictive figures rendered to SVG
//! - [`stats`]: Descriptive statistics, HDI, kernel density, classical t-tests
//! - [`distributions`]: Log-densities used by the models
//! - [`trace`]: Storage of posterior samples

pub mod analyze;
pub mod diagnostics;
pub mod distributions;
pub mod error;
pub mod model;
pub mod plot;
pub mod prelude;
pub mod results;
pub mod sampler;
pub mod stats;
pub mod trace;

pub use analyze::{analyze_one, analyze_two};
pub use error::{BestError, Result};
pub use model::{BestModel, BestModelOne, BestModelTwo};
pub use plot::{
    plot_all, plot_all_one, plot_all_two, plot_data_and_prediction, plot_posterior, PRETTY_BLUE,
};
pub use results::{BestResults, BestResultsOne, BestResultsTwo};
pub use sampler::SamplerConfig;
