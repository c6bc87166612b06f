//! Data models for aimind.
//!
//! This module contains the core data structures shared by the classifier,
//! the normalizer, storage and prompt construction.

mod classification;
mod conversation;
mod emotion;
mod guidance;
mod pipeline;

pub use classification::{ClassificationResult, EmotionScore};
pub use conversation::{
    ConversationTurn, EmotionCount, MessageId, NewMessage, Role, UNLABELED_EMOTION,
};
pub use emotion::{
    AffectTag, BaseEmotion, CALM_LABEL, CRISIS_LABEL, ExtendedEmotion, HIGH_SEVERITY_LABELS,
    SELF_HARM_LABEL,
};
pub use guidance::{AlertLevel, CriticalEvent, Guidance, NO_TECHNIQUES, NO_WARNINGS};
pub use pipeline::{EmotionAnalysis, NormalizationRule, PipelineOutput, PromptContext};
