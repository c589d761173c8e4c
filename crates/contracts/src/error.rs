//! Layered error definitions
//!
//! Categorized by source: config / status source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
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

    // ===== Status Source Errors =====
    /// Transport-level failure reaching the remote clock service
    #[error("status source transport error: {message}")]
    SourceTransport { message: String },

    /// Remote clock service answered with a non-success status
    #[error("status source responded with code {code}")]
    SourceResponse { code: u16 },

    /// Response body could not be decoded into a ClockStatus
    #[error("status decode error: {message}")]
    StatusDecode { message: String },

    // ===== Sink Errors =====
    /// Sink failed to start
    #[error("sink '{sink_name}' start error: {message}")]
    SinkStart { sink_name: String, message: String },

    /// Sink voltage/lifecycle command failed
    #[error("sink '{sink_name}' command error: {message}")]
    SinkCommand { sink_name: String, message: String },

    /// Sink resource release failed during teardown
    #[error("sink '{sink_name}' release error: {message}")]
    SinkRelease { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
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

    /// Create status source transport error
    pub fn source_transport(message: impl Into<String>) -> Self {
        Self::SourceTransport {
            message: message.into(),
        }
    }

    /// Create status decode error
    pub fn status_decode(message: impl Into<String>) -> Self {
        Self::StatusDecode {
            message: message.into(),
        }
    }

    /// Create sink start error
    pub fn sink_start(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkStart {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink command error
    pub fn sink_command(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCommand {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink release error
    pub fn sink_release(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkRelease {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
