//! Error types for BEST operations.
//!
//! Provides rich error context for library consumers.

use thiserror::Error;

/// Main error type for BEST operations.
///
/// # Examples
///
/// ```
/// use best::error::BestError;
///
/// let err = BestError::InvalidGroup {
///     group_id: 3,
///     allowed: "1 or 2",
/// };
/// assert!(err.to_string().contains("must be 1 or 2"));
/// ```
#[derive(Error, Debug)]
pub enum BestError {
    /// Observed data cannot be used to build a model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation received an empty collection.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Group ID outside the range the model knows about.
    #[error("Invalid group ID {group_id}: group ID must be {allowed}")]
    InvalidGroup {
        /// Requested group ID
        group_id: usize,
        /// Human-readable list of valid IDs
        allowed: &'static str,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Variable name not present in the trace.
    #[error("Unknown variable '{name}' (available: {available})")]
    UnknownVariable {
        /// Requested name
        name: String,
        /// Comma-separated list of traced variables
        available: String,
    },

    /// The sampler could not produce a usable trace.
    #[error("Sampling failed: {0}")]
    Sampling(String),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BestError {
    /// Create an invalid hyperparameter error for a credible mass outside (0, 1]
    #[must_use]
    pub fn invalid_credible_mass(credible_mass: f64) -> Self {
        Self::InvalidHyperparameter {
            param: "credible_mass".to_string(),
            value: format!("{credible_mass}"),
            constraint: "0 < credible_mass <= 1".to_string(),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput(context.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, BestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_group_display() {
        let err = BestError::InvalidGroup {
            group_id: 2,
            allowed: "1",
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid group ID 2"));
        assert!(msg.contains("must be 1"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = BestError::InvalidHyperparameter {
            param: "n_samples".to_string(),
            value: "0".to_string(),
            constraint: ">0".to_string(),
        };
        assert!(err.to_string().contains("Invalid hyperparameter"));
        assert!(err.to_string().contains("n_samples"));
        assert!(err.to_string().contains(">0"));
    }

    #[test]
    fn test_invalid_credible_mass() {
        let err = BestError::invalid_credible_mass(1.01);
        assert!(matches!(err, BestError::InvalidHyperparameter { .. }));
        assert!(err.to_string().contains("1.01"));
    }

    #[test]
    fn test_unknown_variable_display() {
        let err = BestError::UnknownVariable {
            name: "Means".to_string(),
            available: "Mean, SD".to_string(),
        };
        assert!(err.to_string().contains("'Means'"));
        assert!(err.to_string().contains("Mean, SD"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BestError = io_err.into();
        assert!(matches!(err, BestError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_empty_input() {
        let err = BestError::empty_input("hdi samples");
        assert_eq!(err.to_string(), "Empty input: hdi samples");
    }
}
