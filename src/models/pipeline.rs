//! Request-scoped pipeline values.

use serde::{Deserialize, Serialize};

use super::{AffectTag, ClassificationResult, ConversationTurn, ExtendedEmotion, MessageId};

/// Which normalizer rule produced the extended emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationRule {
    /// Crisis phrase detected.
    CrisisOverride,
    /// Positive keyword cue.
    PositiveCue,
    /// Negative keyword cue.
    NegativeCue,
    /// Top-2 labels matched a registered combination.
    Combination,
    /// Top label cleared the minimum confidence.
    TopLabel,
    /// Top label below the minimum confidence.
    LowConfidence,
    /// Nothing applied.
    Fallback,
}

impl NormalizationRule {
    /// Returns the rule name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CrisisOverride => "crisis_override",
            Self::PositiveCue => "positive_cue",
            Self::NegativeCue => "negative_cue",
            Self::Combination => "combination",
            Self::TopLabel => "top_label",
            Self::LowConfidence => "low_confidence",
            Self::Fallback => "fallback",
        }
    }
}

/// The outcome of emotion analysis for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// Raw (remapped) classifier output.
    pub classification: ClassificationResult,
    /// Whether a crisis phrase was matched.
    pub crisis: bool,
    /// Normalized extended emotion.
    pub emotion: ExtendedEmotion,
    /// Rule that produced `emotion`.
    pub rule: NormalizationRule,
    /// UI affect for the companion pet.
    pub pet_affect: AffectTag,
}

/// Everything the prompt composer needs, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Alternating history window, oldest first.
    pub history: Vec<ConversationTurn>,
    /// Normalized extended emotion.
    pub emotion: ExtendedEmotion,
    /// Recommended techniques (or placeholder).
    pub techniques: String,
    /// Warnings (or placeholder).
    pub warnings: String,
}

/// Result handed back to the caller of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Identifier the caller must use when persisting the user message.
    pub message_id: MessageId,
    /// Final prompt text for the completion model.
    pub prompt: String,
    /// Normalized extended emotion.
    pub emotion: ExtendedEmotion,
    /// UI affect for the companion pet.
    pub pet_affect: AffectTag,
    /// Whether a crisis phrase was matched.
    pub crisis: bool,
    /// Whether a critical event was emitted for this message.
    pub critical_event: bool,
}
