//! Guidance store trait.

use crate::Result;
use crate::models::{ExtendedEmotion, Guidance};

/// Emotion to (techniques, warnings) lookup.
pub trait GuidanceStore: Send + Sync {
    /// Looks up guidance for an emotion. `Ok(None)` is a normal miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn lookup(&self, emotion: &ExtendedEmotion) -> Result<Option<Guidance>>;

    /// Inserts or replaces guidance for an emotion.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert(&self, emotion: &ExtendedEmotion, guidance: &Guidance) -> Result<()>;
}
