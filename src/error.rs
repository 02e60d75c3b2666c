//! Error types for segment-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Config, MergeTool, etc.)
//! - Automatic conversions from I/O and HTTP client errors
//! - Context information (configuration key, tool name, captured diagnostics)
//!
//! End-of-series is deliberately NOT an error: the retrieval loop reports it
//! through its return value. Only conditions that halt a run appear here.

use thiserror::Error;

/// Result type alias for segment-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for segment-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Base URL could not be parsed or does not end in a path separator
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The URL string that was rejected
        url: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// I/O error (directory creation, segment write, manifest write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error (client construction, request building)
    ///
    /// Transport failures during segment fetches never surface here; the
    /// retrieval loop folds them into its end-of-series outcome.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External merge tool exited non-zero
    #[error("merge tool error: {message}")]
    MergeTool {
        /// Human-readable summary of the failure
        message: String,
        /// Diagnostic output captured from the tool's stderr
        stderr: String,
    },

    /// Required external tool is not on the execution path
    #[error("tool not found: {tool}")]
    ToolNotFound {
        /// Name of the binary that could not be located
        tool: String,
    },

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` if this error came from the external merge tool
    /// (non-zero exit or missing binary).
    #[must_use]
    pub fn is_merge_failure(&self) -> bool {
        matches!(
            self,
            Error::MergeTool { .. } | Error::ToolNotFound { .. }
        )
    }

    /// Diagnostic output captured from the merge tool, if any.
    #[must_use]
    pub fn merge_diagnostics(&self) -> Option<&str> {
        match self {
            Error::MergeTool { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
