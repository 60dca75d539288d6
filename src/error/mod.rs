//! Error types for unit-fixture.
//!
//! Uses `thiserror` for structured error types.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into four categories:
//! - **Configuration**: Config file parsing, validation, or a logger requested without a sink
//! - **Sink**: Output sink binding and write failures
//! - **Lifecycle**: Hooks invoked out of order
//! - **Teardown**: Failures while releasing logging resources
//!
//! Each error has a stable error code (e.g., `UFX-C001`) for programmatic handling.
//!
//! Errors are `Clone`: a deferred initializer caches its outcome, and every
//! caller that observes a failed initialization receives the same error.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::fixture::FixtureState;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration issues (invalid values, unreadable files, missing sink).
    Configuration,
    /// Output sink issues (closed sink, double binding, write failures).
    Sink,
    /// Lifecycle hooks called in the wrong state.
    Lifecycle,
    /// Resource release failures during dispose.
    Teardown,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Sink => "Output sink error",
            Self::Lifecycle => "Lifecycle error",
            Self::Teardown => "Teardown error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Configuration => "C",
            Self::Sink => "S",
            Self::Lifecycle => "L",
            Self::Teardown => "T",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Main error type for fixture operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// A logger was requested but no output sink was supplied.
    #[error("a logger was requested but no output sink was supplied")]
    MissingSink,

    /// A configuration value is out of range.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    // ==========================================================================
    // Sink errors
    // ==========================================================================
    /// The supplied output sink cannot receive lines.
    #[error("invalid output sink: {reason}")]
    InvalidSink { reason: String },

    /// The output adapter already has a sink bound.
    #[error("output adapter is already bound to a sink")]
    SinkAlreadyBound,

    /// An I/O error from a sink.
    #[error("I/O error: {0}")]
    Io(String),

    // ==========================================================================
    // Lifecycle errors
    // ==========================================================================
    /// A lifecycle hook was invoked in a state that does not allow it.
    #[error("cannot {operation} a fixture in state {state}")]
    Lifecycle {
        operation: &'static str,
        state: FixtureState,
    },

    // ==========================================================================
    // Teardown errors
    // ==========================================================================
    /// One or more release steps failed during dispose.
    #[error("teardown failed: {}", failures.join("; "))]
    Teardown { failures: Vec<String> },
}

impl FixtureError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSink | Self::InvalidConfig { .. } | Self::Config(_) => {
                ErrorCategory::Configuration
            }
            Self::InvalidSink { .. } | Self::SinkAlreadyBound | Self::Io(_) => ErrorCategory::Sink,
            Self::Lifecycle { .. } => ErrorCategory::Lifecycle,
            Self::Teardown { .. } => ErrorCategory::Teardown,
        }
    }

    /// Returns the stable error code (e.g., `UFX-C001`).
    #[must_use]
    pub fn code(&self) -> String {
        let number = match self {
            Self::MissingSink
            | Self::InvalidSink { .. }
            | Self::Lifecycle { .. }
            | Self::Teardown { .. } => 1,
            Self::InvalidConfig { .. } | Self::SinkAlreadyBound => 2,
            Self::Config(_) | Self::Io(_) => 3,
        };
        format!("UFX-{}{number:03}", self.category().code_prefix())
    }
}

impl From<io::Error> for FixtureError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_per_variant() {
        assert_eq!(FixtureError::MissingSink.code(), "UFX-C001");
        assert_eq!(
            FixtureError::InvalidConfig {
                field: "collection_len",
                reason: "empty".to_string()
            }
            .code(),
            "UFX-C002"
        );
        assert_eq!(FixtureError::SinkAlreadyBound.code(), "UFX-S002");
        assert_eq!(
            FixtureError::Teardown { failures: vec![] }.code(),
            "UFX-T001"
        );
    }

    #[test]
    fn teardown_message_joins_failures() {
        let err = FixtureError::Teardown {
            failures: vec!["provider: gone".to_string(), "adapter: closed".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "teardown failed: provider: gone; adapter: closed"
        );
    }

    #[test]
    fn io_errors_map_to_sink_category() {
        let err: FixtureError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert_eq!(err.category(), ErrorCategory::Sink);
        assert!(err.to_string().contains("pipe closed"));
    }
}
