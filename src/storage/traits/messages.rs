//! Message store trait.

use crate::Result;
use crate::models::{ConversationTurn, EmotionCount, MessageId, NewMessage};
use chrono::{DateTime, Utc};

/// Ordered, per-user message log.
///
/// Appends are atomic per message. Nothing here enforces alternation:
/// consecutive same-role entries (retries, failed replies) are legal and are
/// collapsed by the history window builder.
pub trait MessageStore: Send + Sync {
    /// Appends a message and returns its identifier.
    ///
    /// Uses `message.id` when set, otherwise generates one.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append(&self, message: &NewMessage) -> Result<MessageId>;

    /// Returns up to `limit` most recent turns for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>>;

    /// Counts the user's own messages since `since`, grouped by emotion.
    ///
    /// Messages without an emotion are counted as
    /// [`UNLABELED_EMOTION`](crate::models::UNLABELED_EMOTION). Sorted by count
    /// descending, then label.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn emotion_counts(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<EmotionCount>>;
}
