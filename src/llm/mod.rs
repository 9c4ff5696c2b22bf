//! LLM provider abstraction layer.
//!
//! Trait-based seam over chat-completion backends so the review classifier
//! can run against any OpenAI-compatible service, or a scripted double in
//! tests.

mod openai;
mod provider;
mod types;

pub use openai::OpenAIProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{Message, MessageRole};
