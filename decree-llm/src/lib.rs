//! DECREE LLM - Translation Oracle Adapter
//!
//! Provider-agnostic trait for the generative translation oracle plus
//! concrete OpenAI and Anthropic chat providers. The rest of the
//! workspace depends only on the narrow `Oracle` contract: a
//! role-tagged conversation in, a single assistant message out.

use async_trait::async_trait;
use decree_core::{ChatMessage, Conversation, DecreeResult, OracleError, Role};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub mod model;
pub mod providers;

pub use model::{Model, Provider};
pub use providers::{AnthropicChatOracle, AnthropicClient, OpenAIChatOracle, OpenAIClient};

// ============================================================================
// SAMPLING PARAMETERS
// ============================================================================

/// Sampling parameters passed through to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: i32,
    pub stop: Option<Vec<String>>,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            max_tokens: 1024,
            stop: None,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl SamplingParams {
    /// Defaults with an explicit temperature.
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

// ============================================================================
// ORACLE TRAIT
// ============================================================================

/// The translation oracle contract.
/// Implementations must be thread-safe (Send + Sync).
///
/// Rate-limit recovery is the implementation's concern: providers
/// retry internally with bounded backoff and surface a terminal error
/// once their retry count is exceeded. Every other transport error
/// propagates immediately.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate a completion for the conversation.
    async fn infer(
        &self,
        conversation: &Conversation,
        sampling: &SamplingParams,
    ) -> DecreeResult<ChatMessage>;

    /// Identifier of the underlying model.
    fn model_id(&self) -> &str;
}

// ============================================================================
// TEST ORACLES
// ============================================================================

/// Oracle that replays a fixed script of responses, in order.
/// Counts invocations so tests can assert call budgets.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicU32,
}

impl ScriptedOracle {
    /// Create a scripted oracle from a sequence of canned responses.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of times `infer` has been invoked.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn infer(
        &self,
        _conversation: &Conversation,
        _sampling: &SamplingParams,
    ) -> DecreeResult<ChatMessage> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let next = self
            .responses
            .lock()
            .map_err(|_| OracleError::InvalidResponse {
                provider: "scripted".to_string(),
                reason: "script lock poisoned".to_string(),
            })?
            .pop_front();

        match next {
            Some(content) => Ok(ChatMessage {
                role: Role::Assistant,
                content,
            }),
            None => Err(OracleError::InvalidResponse {
                provider: "scripted".to_string(),
                reason: "script exhausted".to_string(),
            }
            .into()),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

impl std::fmt::Debug for ScriptedOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedOracle")
            .field("calls", &self.calls())
            .finish()
    }
}

/// Oracle that must never be invoked. Backs dry runs, where the
/// pipeline short-circuits the oracle call entirely; reaching this
/// implementation is a wiring bug, reported loudly.
#[derive(Debug, Default)]
pub struct NullOracle;

impl NullOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Oracle for NullOracle {
    async fn infer(
        &self,
        _conversation: &Conversation,
        _sampling: &SamplingParams,
    ) -> DecreeResult<ChatMessage> {
        Err(OracleError::InvalidResponse {
            provider: "null".to_string(),
            reason: "oracle invoked in dry-run mode".to_string(),
        }
        .into())
    }

    fn model_id(&self) -> &str {
        "null"
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.temperature, 1.0);
        assert_eq!(params.top_p, 0.95);
        assert_eq!(params.max_tokens, 1024);
        assert!(params.stop.is_none());
        assert_eq!(params.frequency_penalty, 0.0);
        assert_eq!(params.presence_penalty, 0.0);
    }

    #[test]
    fn test_with_temperature_overrides_only_temperature() {
        let params = SamplingParams::with_temperature(0.5);
        assert_eq!(params.temperature, 0.5);
        assert_eq!(params.top_p, 0.95);
    }

    #[tokio::test]
    async fn test_scripted_oracle_replays_in_order() {
        let oracle = ScriptedOracle::new(["first", "second"]);
        let conv = Conversation::new();
        let params = SamplingParams::default();

        let reply = oracle.infer(&conv, &params).await.unwrap();
        assert_eq!(reply.content, "first");
        assert_eq!(reply.role, Role::Assistant);

        let reply = oracle.infer(&conv, &params).await.unwrap();
        assert_eq!(reply.content, "second");
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_scripted_oracle_errors_when_exhausted() {
        let oracle = ScriptedOracle::new(Vec::<String>::new());
        let conv = Conversation::new();
        let result = oracle.infer(&conv, &SamplingParams::default()).await;
        assert!(result.is_err());
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_null_oracle_always_errors() {
        let oracle = NullOracle::new();
        let conv = Conversation::new();
        let result = oracle.infer(&conv, &SamplingParams::default()).await;
        assert!(result.is_err());
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// A scripted oracle replays exactly its script, in order, and
        /// counts one call per response plus one for the exhaustion.
        #[test]
        fn prop_scripted_oracle_is_faithful(
            script in prop::collection::vec(".{0,40}", 0..8)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();

            runtime.block_on(async {
                let oracle = ScriptedOracle::new(script.clone());
                let conv = Conversation::new();
                let params = SamplingParams::default();

                for expected in &script {
                    let reply = oracle.infer(&conv, &params).await.unwrap();
                    prop_assert_eq!(&reply.content, expected);
                }

                prop_assert!(oracle.infer(&conv, &params).await.is_err());
                prop_assert_eq!(oracle.calls(), script.len() as u32 + 1);
                Ok(())
            })?;
        }
    }
}
