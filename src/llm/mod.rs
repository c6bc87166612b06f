//! Completion model client.
//!
//! The pipeline never calls the completion model itself; [`ChatService`]
//! does, after the prompt has been composed.
//!
//! [`ChatService`]: crate::services::ChatService

mod openai;

pub use openai::OpenAiClient;

use crate::Result;

/// Trait for completion model providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// The model identifier recorded alongside stored replies.
    fn model(&self) -> &str;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Generates a completion with a system prompt.
    ///
    /// Default implementation concatenates system and user prompts.
    /// Providers should override this to use native system prompt support.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        let combined = format!("{system}\n\n---\n\n{user}");
        self.complete(&combined)
    }
}
