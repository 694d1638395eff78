//! Anthropic chat oracle implementation

use super::client::AnthropicClient;
use super::types::{MessagesRequest, MessagesResponse, WireMessage};
use crate::providers::{credential_from_env, invalid_response};
use crate::{Model, Oracle, SamplingParams};
use async_trait::async_trait;
use decree_core::{ChatMessage, Conversation, DecreeResult, Role};

/// Oracle backed by the Anthropic messages API.
///
/// The messages API carries system context in a dedicated field, so
/// system turns are folded into it and only user/assistant turns go
/// into the message list.
pub struct AnthropicChatOracle {
    client: AnthropicClient,
    model: String,
}

impl AnthropicChatOracle {
    /// Create a new Anthropic chat oracle.
    pub fn new(api_key: impl Into<String>, model: Model) -> Self {
        Self {
            client: AnthropicClient::new(api_key, 50),
            model: model.id().to_string(),
        }
    }

    /// Create an oracle reading the credential from `ANTHROPIC_API_KEY`.
    /// A missing credential is a fatal configuration error.
    pub fn from_env(model: Model) -> DecreeResult<Self> {
        let api_key = credential_from_env("ANTHROPIC_API_KEY")?;
        Ok(Self::new(api_key, model))
    }
}

#[async_trait]
impl Oracle for AnthropicChatOracle {
    async fn infer(
        &self,
        conversation: &Conversation,
        sampling: &SamplingParams,
    ) -> DecreeResult<ChatMessage> {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();

        for message in conversation.messages() {
            match message.role {
                Role::System => system_parts.push(message.content.clone()),
                Role::User | Role::Assistant => messages.push(WireMessage {
                    role: message.role.as_str().to_string(),
                    content: message.content.clone(),
                }),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n"))
        };

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: sampling.max_tokens,
            messages,
            system,
            temperature: Some(sampling.temperature),
            top_p: Some(sampling.top_p),
            stop_sequences: sampling.stop.clone(),
        };

        let response: MessagesResponse = self
            .client
            .request_with_backoff("messages", &request)
            .await?;

        if response.content.is_empty() {
            return Err(invalid_response("anthropic", "No content in response"));
        }

        let text = response
            .content
            .iter()
            .filter(|block| block.r#type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(ChatMessage {
            role: Role::Assistant,
            content: text,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for AnthropicChatOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicChatOracle")
            .field("model", &self.model)
            .finish()
    }
}
