//! Error types for path traversal.
//!
//! Runtime anomalies (bad duration, clashing axes, zero tangents) are corrected
//! in place and never reach the caller. The variants here are only returned by
//! configuration loading and by the playback commands that need a path.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TraversalError {
    /// Invalid traversal configuration
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// No path is set, or the path has no segments
    #[error("Traversal does not have a valid path set")]
    MissingPath,

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TraversalError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::MissingPath => "resource",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TraversalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
