//! Unified error hierarchy for autoregrs
//!
//! The adjustment engine itself is fail-open: missing readiness data yields
//! "no adjustment" rather than an error. These types cover the edges of the
//! system instead: configuration, data sources, and invalid caller input.

use thiserror::Error;

/// Top-level error type for all autoregrs operations
#[derive(Debug, Error)]
pub enum AutoregError {
    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// External collaborator errors (biometrics, catalog, program store)
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Calculation errors
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },
}

/// Errors raised by the external collaborators the engine reads from
#[derive(Debug, Error)]
pub enum SourceError {
    /// Goal does not exist in the program store
    #[error("Goal not found: {goal_id}")]
    GoalNotFound { goal_id: String },

    /// Biometric provider could not supply records
    #[error("Biometric data unavailable: {reason}")]
    BiometricsUnavailable { reason: String },
}

/// Result type alias for autoregrs operations
pub type Result<T> = std::result::Result<T, AutoregError>;

impl AutoregError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AutoregError::Validation(_) => ErrorSeverity::Warning,
            AutoregError::Source(SourceError::BiometricsUnavailable { .. }) => {
                ErrorSeverity::Warning
            }
            AutoregError::Calculation(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AutoregError::Source(SourceError::GoalNotFound { goal_id }) => {
                format!("No training program found for goal '{}'.", goal_id)
            }
            AutoregError::Source(SourceError::BiometricsUnavailable { .. }) => {
                "Recovery data is unavailable right now. Train as planned.".to_string()
            }
            AutoregError::Calculation(CalculationError::InvalidParameter {
                parameter,
                value,
                ..
            }) => {
                format!("'{}' is not a valid value for {}.", value, parameter)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = AutoregError::Validation("bad record".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = AutoregError::Configuration("missing".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_user_messages() {
        let err = AutoregError::Source(SourceError::GoalNotFound {
            goal_id: "hypertrophy".to_string(),
        });
        assert!(err.user_message().contains("hypertrophy"));

        let err = AutoregError::Calculation(CalculationError::InvalidParameter {
            calculation: "rpe".to_string(),
            parameter: "base_rpe".to_string(),
            value: "11".to_string(),
        });
        assert!(err.user_message().contains("base_rpe"));
    }
}
