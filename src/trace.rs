//! Posterior samples grouped by variable and chain.

use crate::error::{BestError, Result};
use serde::{Deserialize, Serialize};

/// Samples of a single traced variable.
///
/// Draws are stored chain-major: all draws of chain 0, then chain 1, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceVariable {
    /// Variable name, e.g. `"Difference of means"`
    pub name: String,
    samples: Vec<f64>,
}

/// The collection of posterior samples.
///
/// # Example
///
/// ```
/// use best::trace::Trace;
///
/// let trace = Trace::from_samples(vec![("Mean".to_string(), vec![0.1, 0.2, 0.3])]).unwrap();
/// assert_eq!(trace.get("Mean").unwrap(), &[0.1, 0.2, 0.3]);
/// assert!(trace.get("SD").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    n_chains: usize,
    n_draws: usize,
    variables: Vec<TraceVariable>,
}

impl Trace {
    /// Build a trace from sampler output.
    ///
    /// `chains[c][d]` is the traced point of draw `d` in chain `c`, ordered as `names`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no chains, chains differ in length, or a
    /// point does not match the number of names.
    pub fn from_chain_points(names: &[&str], chains: &[Vec<Vec<f64>>]) -> Result<Self> {
        let n_draws = chains
            .first()
            .map(Vec::len)
            .ok_or_else(|| BestError::empty_input("trace chains"))?;
        if chains.iter().any(|c| c.len() != n_draws) {
            return Err(BestError::Sampling(
                "all chains must contain the same number of draws".into(),
            ));
        }
        if chains.iter().flatten().any(|point| point.len() != names.len()) {
            return Err(BestError::Sampling(format!(
                "traced points must have {} values",
                names.len()
            )));
        }

        let variables = names
            .iter()
            .enumerate()
            .map(|(idx, name)| TraceVariable {
                name: (*name).to_string(),
                samples: chains.iter().flatten().map(|point| point[idx]).collect(),
            })
            .collect();

        Ok(Self {
            n_chains: chains.len(),
            n_draws,
            variables,
        })
    }

    /// Build a single-chain trace from named sample vectors.
    ///
    /// Useful for posterior samples obtained elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if no variables are given or the vectors differ in length.
    pub fn from_samples<I>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f64>)>,
    {
        let variables: Vec<TraceVariable> = variables
            .into_iter()
            .map(|(name, samples)| TraceVariable { name, samples })
            .collect();

        let n_draws = variables
            .first()
            .map(|v| v.samples.len())
            .ok_or_else(|| BestError::empty_input("trace variables"))?;
        if variables.iter().any(|v| v.samples.len() != n_draws) {
            return Err(BestError::InvalidInput(
                "all variables must have the same number of samples".into(),
            ));
        }

        Ok(Self {
            n_chains: 1,
            n_draws,
            variables,
        })
    }

    /// Number of chains.
    #[must_use]
    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    /// Number of draws per chain.
    #[must_use]
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    /// Total number of samples per variable (all chains).
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_chains * self.n_draws
    }

    /// Whether the trace holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the traced variables.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Whether a variable is traced.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }

    /// All samples of a variable, chains concatenated.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::UnknownVariable`] for a name that is not traced.
    pub fn get(&self, name: &str) -> Result<&[f64]> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.samples.as_slice())
            .ok_or_else(|| BestError::UnknownVariable {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Samples of a variable split per chain.
    ///
    /// # Errors
    ///
    /// Returns [`BestError::UnknownVariable`] for a name that is not traced.
    pub fn chains(&self, name: &str) -> Result<Vec<&[f64]>> {
        let samples = self.get(name)?;
        if self.n_draws == 0 {
            return Ok(Vec::new());
        }
        Ok(samples.chunks(self.n_draws).collect())
    }
}
