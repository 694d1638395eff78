//! Oracle provider implementations
//!
//! Concrete `Oracle` implementations for the supported backends.

pub mod anthropic;
pub mod openai;

pub use anthropic::{AnthropicChatOracle, AnthropicClient};
pub use openai::{OpenAIChatOracle, OpenAIClient};

use decree_core::{DecreeError, OracleError};

pub(crate) fn request_failed(
    provider: &str,
    status: i32,
    message: impl Into<String>,
) -> DecreeError {
    DecreeError::Oracle(OracleError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> DecreeError {
    DecreeError::Oracle(OracleError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> DecreeError {
    DecreeError::Oracle(OracleError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

pub(crate) fn invalid_api_key(provider: &str) -> DecreeError {
    DecreeError::Oracle(OracleError::InvalidApiKey {
        provider: provider.to_string(),
    })
}

/// Read a provider credential from the environment.
/// Absence is a fatal configuration error, reported once at startup.
pub(crate) fn credential_from_env(var: &str) -> Result<String, decree_core::ConfigError> {
    std::env::var(var).map_err(|_| decree_core::ConfigError::MissingRequired {
        field: var.to_string(),
    })
}
