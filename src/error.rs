//! Error types for the engagement engine.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures inside a single pattern system's pipeline.
///
/// Every variant is recoverable: the orchestrator swaps in a fallback
/// enrichment for the failing system and keeps the other three.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("{system}: step '{step}' is not implemented")]
    NotImplemented {
        system: &'static str,
        step: &'static str,
    },

    #[error("{system}: invalid {field}: {reason}")]
    Validation {
        system: &'static str,
        field: String,
        reason: String,
    },

    #[error("{system} timed out after {after:?}")]
    Timeout {
        system: &'static str,
        after: Duration,
    },
}

impl PatternError {
    pub fn not_implemented(system: &'static str, step: &'static str) -> Self {
        Self::NotImplemented { system, step }
    }

    pub fn validation(
        system: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            system,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Reject a score outside the closed unit interval.
    pub fn check_unit(system: &'static str, field: &str, value: f64) -> Result<f64, Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(Self::validation(
                system,
                field,
                format!("expected a value in [0, 1], got {value}"),
            ))
        }
    }

    /// Name of the pattern system that failed.
    pub fn system(&self) -> &'static str {
        match self {
            Self::NotImplemented { system, .. }
            | Self::Validation { system, .. }
            | Self::Timeout { system, .. } => system,
        }
    }

    /// Timeouts are treated like a missing implementation.
    pub fn is_not_implemented_class(&self) -> bool {
        matches!(self, Self::NotImplemented { .. } | Self::Timeout { .. })
    }
}

/// Tiered content fetch failures. These reach the rendering side as an error
/// state and are never replaced by a shallower tier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to load {tier} content: {reason}")]
    LoadFailed { tier: String, reason: String },
}
