//! Layered error definitions
//!
//! Categorized by source: config / network / layout / detector / finalize / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CoreError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Remote Store Errors =====
    /// Timeout or connection failure talking to the remote store
    #[error("transient network error during {operation}: {message}")]
    TransientNetwork { operation: String, message: String },

    /// Credential acquisition or refresh failure
    #[error("auth error: {message}")]
    Auth { message: String },

    /// Remote document did not match the expected shape
    #[error("malformed document at '{path}': {reason}")]
    MalformedDocument { path: String, reason: String },

    // ===== Layout Errors =====
    /// A higher-priority path layout answered with a structurally invalid
    /// document; falling through could target the wrong account's data.
    #[error("ambiguous path layout {layout}: {reason}")]
    LayoutAmbiguous { layout: String, reason: String },

    // ===== Detector Errors =====
    /// Hazard classifier invocation failure (distinct from a clean negative)
    #[error("detector '{detector}' failure: {message}")]
    DetectorFailure { detector: String, message: String },

    // ===== Finalize Errors =====
    /// Bulk replace did not succeed within the retry budget
    #[error("finalize incomplete for ride {ride_id} after {attempts} attempts")]
    FinalizeIncomplete { ride_id: u64, attempts: u32 },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transient network error
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create malformed document error
    pub fn malformed_document(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create ambiguous layout error
    pub fn layout_ambiguous(layout: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LayoutAmbiguous {
            layout: layout.into(),
            reason: reason.into(),
        }
    }

    /// Create detector failure
    pub fn detector_failure(detector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DetectorFailure {
            detector: detector.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether a retry with backoff is worth attempting
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork { .. })
    }
}
