//! LLM integration
//!
//! OpenAI-compatible chat completions client used by the response composer.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientBuilder};
pub use types::{ChatRequest, ChatResponse, LlmResponse, Message, MessageRole};
