//! Error types for Decree operations

use thiserror::Error;

/// Translation oracle transport errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("API credential missing or rejected by {provider}")]
    InvalidApiKey { provider: String },

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Rate-limit retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl OracleError {
    /// Whether the adapter may retry this error internally.
    /// Only rate-limit responses qualify; everything else is terminal.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, OracleError::RateLimited { .. })
    }
}

/// Configuration errors. These are fatal at startup, never item-level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Model not supported: {model}")]
    ModelNotSupported { model: String },
}

/// Master error type for all Decree errors.
#[derive(Debug, Clone, Error)]
pub enum DecreeError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias using DecreeError.
pub type DecreeResult<T> = Result<T, DecreeError>;
