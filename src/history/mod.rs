//! History window builder.
//!
//! Produces the bounded, strictly alternating slice of past turns fed into
//! prompt construction.

use crate::models::ConversationTurn;
use crate::storage::MessageStore;
use crate::{Error, Result};
use tracing::instrument;

/// Default number of user/assistant pairs in the window.
pub const DEFAULT_MAX_PAIRS: usize = 3;

/// Builds the history window for a user.
///
/// Fetches up to `2 × max_pairs` most recent turns, restores chronological
/// order and drops every turn whose role equals the previously kept turn's
/// role. The result never has two adjacent same-role turns and holds at most
/// `2 × max_pairs` entries.
///
/// # Errors
///
/// Returns [`Error::HistoryStore`] if the store cannot be read. An empty
/// window is never substituted for a failed read.
#[instrument(skip(store), fields(operation = "build_window"))]
pub fn build_window(
    store: &dyn MessageStore,
    user_id: &str,
    max_pairs: usize,
) -> Result<Vec<ConversationTurn>> {
    let limit = max_pairs.saturating_mul(2);
    if limit == 0 {
        return Ok(Vec::new());
    }

    let newest_first = store
        .recent_turns(user_id, limit)
        .map_err(|e| Error::HistoryStore {
            operation: "recent_turns".to_string(),
            cause: e.to_string(),
        })?;

    let window = alternate(newest_first);
    tracing::debug!(turns = window.len(), "History window built");
    Ok(window)
}

/// Reverses newest-first turns into chronological order and collapses
/// consecutive same-role turns, keeping the earliest of each run.
#[must_use]
pub fn alternate(newest_first: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
    let mut window: Vec<ConversationTurn> = Vec::with_capacity(newest_first.len());
    for turn in newest_first.into_iter().rev() {
        if window.last().is_some_and(|last| last.role == turn.role) {
            continue;
        }
        window.push(turn);
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewMessage, Role};
    use crate::storage::InMemoryStore;

    struct FailingStore;

    impl MessageStore for FailingStore {
        fn append(&self, _message: &NewMessage) -> Result<crate::models::MessageId> {
            Err(Error::OperationFailed {
                operation: "append".to_string(),
                cause: "disk full".to_string(),
            })
        }

        fn recent_turns(&self, _user_id: &str, _limit: usize) -> Result<Vec<ConversationTurn>> {
            Err(Error::OperationFailed {
                operation: "recent_turns".to_string(),
                cause: "disk I/O error".to_string(),
            })
        }

        fn emotion_counts(
            &self,
            _user_id: &str,
            _since: chrono::DateTime<chrono::Utc>,
        ) -> Result<Vec<crate::models::EmotionCount>> {
            Ok(Vec::new())
        }
    }

    fn seed(store: &InMemoryStore, turns: &[(Role, &str)]) {
        for (role, content) in turns {
            store.append(&NewMessage::new("u1", *role, *content)).unwrap();
        }
    }

    #[test]
    fn test_window_is_chronological() {
        let store = InMemoryStore::new();
        seed(
            &store,
            &[
                (Role::User, "hola"),
                (Role::Assistant, "hola, ¿cómo estás?"),
                (Role::User, "regular"),
            ],
        );

        let window = build_window(&store, "u1", 3).unwrap();
        assert_eq!(
            window,
            vec![
                ConversationTurn::user("hola"),
                ConversationTurn::assistant("hola, ¿cómo estás?"),
                ConversationTurn::user("regular"),
            ]
        );
    }

    #[test]
    fn test_window_collapses_retries() {
        let store = InMemoryStore::new();
        seed(
            &store,
            &[
                (Role::User, "primer intento"),
                (Role::User, "segundo intento"),
                (Role::Assistant, "respuesta"),
                (Role::Assistant, "respuesta repetida"),
            ],
        );

        let window = build_window(&store, "u1", 3).unwrap();
        assert_eq!(
            window,
            vec![
                ConversationTurn::user("primer intento"),
                ConversationTurn::assistant("respuesta"),
            ]
        );
    }

    #[test]
    fn test_window_bounded() {
        let store = InMemoryStore::new();
        for i in 0..10 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store
                .append(&NewMessage::new("u1", role, format!("turno {i}")))
                .unwrap();
        }

        let window = build_window(&store, "u1", 2).unwrap();
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].content, "turno 6");
        assert_eq!(window[3].content, "turno 9");
    }

    #[test]
    fn test_zero_pairs() {
        let store = InMemoryStore::new();
        seed(&store, &[(Role::User, "hola")]);
        assert!(build_window(&store, "u1", 0).unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let err = build_window(&FailingStore, "u1", 3).unwrap_err();
        assert!(matches!(err, Error::HistoryStore { ref operation, .. } if operation == "recent_turns"));
        assert!(err.to_string().contains("disk I/O error"));
    }
}
