//! # Aimind
//!
//! Emotion detection, crisis escalation and prompt grounding for an
//! empathetic chat assistant.
//!
//! Aimind turns a free-text user message into a normalized emotional state,
//! escalates detected self-harm or crisis risk, and builds a grounded
//! instruction for a downstream conversational model from a bounded,
//! alternating window of conversation history.
//!
//! ## Pipeline
//!
//! - Classifier adapter: multi-label base-emotion scores from a shared model
//! - Crisis detector: exact, fuzzy and word-subset phrase matching
//! - Emotion normalizer: ordered decision table onto the guidance vocabulary
//! - Pet-affect mapper: UI-facing affect, independent of crisis framing
//! - History window builder: strict user/assistant alternation
//! - Prompt composer: history + emotion + techniques + warnings
//!
//! ## Example
//!
//! ```rust,ignore
//! use aimind::services::PipelineStores;
//! use aimind::{AimindConfig, EmotionPipeline, SqliteStore, shared_classifier};
//! use std::sync::Arc;
//!
//! let config = AimindConfig::load(None)?;
//! let store = Arc::new(SqliteStore::new(config.database_path())?);
//! let classifier = shared_classifier(&config.classifier)?;
//! let pipeline = EmotionPipeline::from_config(&config, classifier, PipelineStores::shared(store))?;
//! let output = pipeline.prepare("user-1", "Hoy me siento muy feliz")?;
//! println!("{}", output.prompt);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod classifier;
pub mod config;
pub mod crisis;
pub mod emotion;
pub mod history;
pub mod llm;
pub mod models;
pub mod observability;
pub mod prompt;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use classifier::{EmotionClassifier, HttpClassifier, shared_classifier};
pub use config::AimindConfig;
pub use crisis::CrisisDetector;
pub use emotion::{EmotionNormalizer, pet_affect};
pub use history::build_window;
pub use models::{
    AffectTag, BaseEmotion, ClassificationResult, ConversationTurn, EmotionScore,
    ExtendedEmotion, PipelineOutput, Role,
};
pub use prompt::compose_prompt;
pub use services::{ChatService, ChatTurn, EmotionPipeline, PipelineStores};
pub use storage::{CriticalEventSink, GuidanceStore, InMemoryStore, MessageStore, SqliteStore};

/// Error type for aimind operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `ClassifierUnavailable` | Classifier backend unreachable, failed to load, or returned garbage |
/// | `HistoryStore` | The message store cannot be read while building the history window |
/// | `InvalidInput` | Empty message text, out-of-range thresholds, unknown roles |
/// | `OperationFailed` | Any other storage, IO or HTTP failure |
///
/// An empty classification and a missing guidance row are not errors; they
/// are handled as values by the normalizer and [`models::Guidance::resolve`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The emotion classifier cannot produce a result.
    ///
    /// Fatal for the request: no emotion can be attributed, and callers must
    /// not invent one.
    #[error("classifier unavailable: {cause}")]
    ClassifierUnavailable {
        /// The underlying cause.
        cause: String,
    },

    /// The message store failed while reading conversation history.
    ///
    /// Fatal for the request: composing a prompt without context would
    /// silently degrade answer quality.
    #[error("history store '{operation}' failed: {cause}")]
    HistoryStore {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for aimind operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("empty message".to_string());
        assert_eq!(err.to_string(), "invalid input: empty message");

        let err = Error::ClassifierUnavailable {
            cause: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "classifier unavailable: connection refused");

        let err = Error::HistoryStore {
            operation: "recent_turns".to_string(),
            cause: "disk I/O error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "history store 'recent_turns' failed: disk I/O error"
        );
    }
}
