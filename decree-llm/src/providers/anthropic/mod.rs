//! Anthropic messages provider

mod chat;
mod client;
mod types;

pub use chat::AnthropicChatOracle;
pub use client::AnthropicClient;
