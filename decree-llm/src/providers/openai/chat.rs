//! OpenAI chat oracle implementation

use super::client::OpenAIClient;
use super::types::{CompletionRequest, CompletionResponse, WireMessage};
use crate::providers::{credential_from_env, invalid_response};
use crate::{Model, Oracle, SamplingParams};
use async_trait::async_trait;
use decree_core::{ChatMessage, Conversation, DecreeResult, Role};

/// Oracle backed by the OpenAI chat completions API.
pub struct OpenAIChatOracle {
    client: OpenAIClient,
    model: String,
}

impl OpenAIChatOracle {
    /// Create a new OpenAI chat oracle.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `model` - Supported model to run
    pub fn new(api_key: impl Into<String>, model: Model) -> Self {
        Self {
            client: OpenAIClient::new(api_key, 60),
            model: model.id().to_string(),
        }
    }

    /// Create an oracle reading the credential from `OPENAI_API_KEY`.
    /// A missing credential is a fatal configuration error.
    pub fn from_env(model: Model) -> DecreeResult<Self> {
        let api_key = credential_from_env("OPENAI_API_KEY")?;
        Ok(Self::new(api_key, model))
    }
}

#[async_trait]
impl Oracle for OpenAIChatOracle {
    async fn infer(
        &self,
        conversation: &Conversation,
        sampling: &SamplingParams,
    ) -> DecreeResult<ChatMessage> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: conversation.messages().iter().map(WireMessage::from).collect(),
            max_tokens: Some(sampling.max_tokens),
            temperature: Some(sampling.temperature),
            top_p: Some(sampling.top_p),
            stop: sampling.stop.clone(),
            frequency_penalty: Some(sampling.frequency_penalty),
            presence_penalty: Some(sampling.presence_penalty),
        };

        let response: CompletionResponse = self
            .client
            .request_with_backoff("chat/completions", &request)
            .await?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| invalid_response("openai", "No completion in response"))?;

        let role = message.parsed_role().unwrap_or(Role::Assistant);

        Ok(ChatMessage {
            role,
            content: message.content,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAIChatOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIChatOracle")
            .field("model", &self.model)
            .finish()
    }
}
