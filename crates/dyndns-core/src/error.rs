//! Error types for the dynamic DNS system
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for host manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynamic DNS system
#[derive(Error, Debug)]
pub enum Error {
    /// An update was requested for a host with no existing record
    #[error("Invalid Host: {0}")]
    InvalidHost(String),

    /// The supplied address is neither a valid IPv4 nor IPv6 address
    #[error("Invalid IP Address: {0}")]
    InvalidIpAddress(String),

    /// The operation is not supported by this backend
    #[error("Not Implemented: {0}")]
    NotImplemented(&'static str),

    /// HTTP transport errors (connection failures, non-2xx status)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider-specific error (malformed responses, bad zone data)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Cache store errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid host error
    pub fn invalid_host(host: impl Into<String>) -> Self {
        Self::InvalidHost(host.into())
    }

    /// Create an invalid IP address error
    pub fn invalid_ip(ip: impl Into<String>) -> Self {
        Self::InvalidIpAddress(ip.into())
    }

    /// Create a "not implemented" error for the named operation
    pub fn not_implemented(operation: &'static str) -> Self {
        Self::NotImplemented(operation)
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a cache store error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was caused by the caller's input rather than a backend failure
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidHost(_) | Self::InvalidIpAddress(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
