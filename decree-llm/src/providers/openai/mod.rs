//! OpenAI chat completion provider

mod chat;
mod client;
mod types;

pub use chat::OpenAIChatOracle;
pub use client::OpenAIClient;
