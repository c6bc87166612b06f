//! Chat turn service.
//!
//! Wraps the pipeline with message persistence and the completion call.

use super::EmotionPipeline;
use crate::llm::LlmProvider;
use crate::models::{AffectTag, ExtendedEmotion, NewMessage, Role};
use crate::prompt::{ResponseAffect, SYSTEM_INSTRUCTION, parse_response_affect};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Model name recorded on user messages.
pub const USER_MODEL_TAG: &str = "usuario";

/// The outcome of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// Prompt sent to the completion model.
    pub prompt: String,
    /// Reply text with any affect annotation removed.
    pub reply: String,
    /// Normalized emotion of the user message.
    pub emotion: ExtendedEmotion,
    /// UI affect for the companion pet.
    pub pet_affect: AffectTag,
    /// Whether a critical event was emitted.
    pub critical_event: bool,
    /// Tone annotation reported by the model, if any.
    pub response_affect: Option<ResponseAffect>,
}

/// Runs a full chat turn: analyze, persist, prompt, complete, persist.
pub struct ChatService {
    pipeline: EmotionPipeline,
    llm: Arc<dyn LlmProvider>,
}

impl ChatService {
    /// Creates a chat service.
    #[must_use]
    pub fn new(pipeline: EmotionPipeline, llm: Arc<dyn LlmProvider>) -> Self {
        Self { pipeline, llm }
    }

    /// Returns the underlying pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &EmotionPipeline {
        &self.pipeline
    }

    /// Handles one user message.
    ///
    /// The user message is stored before the prompt is built, so it closes
    /// the history window. The reply is stored only when the completion
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if analysis, persistence, history retrieval or the
    /// completion call fails.
    #[instrument(skip(self, text), fields(user_id = %user_id, text_len = text.len(), provider = self.llm.name()))]
    pub fn send(&self, user_id: &str, text: &str) -> Result<ChatTurn> {
        let analysis = self.pipeline.analyze(text)?;

        let messages = &self.pipeline.stores().messages;
        let message_id = messages.append(
            &NewMessage::new(user_id, Role::User, text)
                .with_emotion(analysis.emotion.as_str())
                .with_model(USER_MODEL_TAG),
        )?;

        let output = self.pipeline.prepare_with(user_id, &analysis, message_id)?;

        let raw_reply = self.llm.complete_with_system(SYSTEM_INSTRUCTION, &output.prompt)?;
        let (reply, response_affect) = parse_response_affect(&raw_reply);

        messages.append(
            &NewMessage::new(user_id, Role::Assistant, reply.as_str())
                .with_emotion(output.emotion.as_str())
                .with_model(self.llm.model()),
        )?;

        tracing::info!(
            emotion = %output.emotion,
            critical_event = output.critical_event,
            reply_len = reply.len(),
            "Chat turn completed"
        );

        Ok(ChatTurn {
            prompt: output.prompt,
            reply,
            emotion: output.emotion,
            pet_affect: output.pet_affect,
            critical_event: output.critical_event,
            response_affect,
        })
    }
}
