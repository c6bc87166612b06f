//! In-memory store.
//!
//! Non-persistent implementation of every storage trait, for tests and for
//! embedding the pipeline without a database.

use crate::models::{
    ConversationTurn, CriticalEvent, EmotionCount, ExtendedEmotion, Guidance, MessageId,
    NewMessage, Role, UNLABELED_EMOTION,
};
use crate::storage::traits::{CriticalEventSink, GuidanceStore, MessageStore};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct StoredMessage {
    id: MessageId,
    user_id: String,
    role: Role,
    content: String,
    emotion: Option<String>,
    created_at: DateTime<Utc>,
}

/// In-memory store backed by `RwLock`ed collections.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    messages: RwLock<Vec<StoredMessage>>,
    guidance: RwLock<HashMap<String, Guidance>>,
    events: RwLock<Vec<(String, CriticalEvent)>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Lists a user's critical events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn critical_events(&self, user_id: &str) -> Result<Vec<CriticalEvent>> {
        let events = read(&self.events, "critical_events")?;
        Ok(events
            .iter()
            .rev()
            .filter(|(_, e)| e.user_id == user_id)
            .map(|(_, e)| e.clone())
            .collect())
    }
}

impl MessageStore for InMemoryStore {
    fn append(&self, message: &NewMessage) -> Result<MessageId> {
        let mut messages = write(&self.messages, "append")?;
        let id = message.id.clone().unwrap_or_else(MessageId::generate);
        if messages.iter().any(|m| m.id == id) {
            return Err(Error::OperationFailed {
                operation: "append".to_string(),
                cause: format!("duplicate message id '{id}'"),
            });
        }
        messages.push(StoredMessage {
            id: id.clone(),
            user_id: message.user_id.clone(),
            role: message.role,
            content: message.content.clone(),
            emotion: message.emotion.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let messages = read(&self.messages, "recent_turns")?;
        Ok(messages
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .take(limit)
            .map(|m| ConversationTurn::new(m.role, m.content.clone()))
            .collect())
    }

    fn emotion_counts(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<EmotionCount>> {
        let messages = read(&self.messages, "emotion_counts")?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for message in messages
            .iter()
            .filter(|m| m.user_id == user_id && m.role == Role::User && m.created_at >= since)
        {
            let label = message
                .emotion
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .unwrap_or(UNLABELED_EMOTION);
            *counts.entry(label.to_string()).or_default() += 1;
        }

        let mut counts: Vec<EmotionCount> = counts
            .into_iter()
            .map(|(emotion, count)| EmotionCount { emotion, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.emotion.cmp(&b.emotion)));
        Ok(counts)
    }
}

impl GuidanceStore for InMemoryStore {
    fn lookup(&self, emotion: &ExtendedEmotion) -> Result<Option<Guidance>> {
        let guidance = read(&self.guidance, "lookup")?;
        Ok(guidance.get(emotion.as_str()).cloned())
    }

    fn upsert(&self, emotion: &ExtendedEmotion, guidance: &Guidance) -> Result<()> {
        write(&self.guidance, "upsert")?.insert(emotion.as_str().to_string(), guidance.clone());
        Ok(())
    }
}

impl CriticalEventSink for InMemoryStore {
    fn record(&self, event: &CriticalEvent) -> Result<String> {
        let id = uuid::Uuid::now_v7().to_string();
        write(&self.events, "record")?.push((id.clone(), event.clone()));
        Ok(id)
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, operation: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    })
}

fn write<'a, T>(lock: &'a RwLock<T>, operation: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_turns_newest_first_per_user() {
        let store = InMemoryStore::new();
        store.append(&NewMessage::new("u1", Role::User, "uno")).unwrap();
        store.append(&NewMessage::new("u2", Role::User, "ajeno")).unwrap();
        store.append(&NewMessage::new("u1", Role::Assistant, "dos")).unwrap();

        let turns = store.recent_turns("u1", 5).unwrap();
        assert_eq!(
            turns,
            vec![ConversationTurn::assistant("dos"), ConversationTurn::user("uno")]
        );
        assert_eq!(store.message_count(), 3);
    }

    #[test]
    fn test_emotion_counts_only_user_messages() {
        let store = InMemoryStore::new();
        let since = Utc::now() - chrono::Duration::minutes(1);
        store
            .append(&NewMessage::new("u1", Role::User, "a").with_emotion("miedo"))
            .unwrap();
        store.append(&NewMessage::new("u1", Role::User, "b")).unwrap();
        store
            .append(&NewMessage::new("u1", Role::Assistant, "c").with_emotion("miedo"))
            .unwrap();

        let counts = store.emotion_counts("u1", since).unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.count == 1));
        assert_eq!(counts[0].emotion, "miedo");
        assert_eq!(counts[1].emotion, UNLABELED_EMOTION);
    }

    #[test]
    fn test_guidance_roundtrip() {
        let store = InMemoryStore::new();
        let emotion = ExtendedEmotion::from("duelo");
        store.upsert(&emotion, &Guidance::new("Escucha activa", "No apresurar")).unwrap();
        assert_eq!(
            store.lookup(&emotion).unwrap().unwrap().warnings.as_deref(),
            Some("No apresurar")
        );
        assert!(store.lookup(&ExtendedEmotion::calm()).unwrap().is_none());
    }

    #[test]
    fn test_record_event() {
        let store = InMemoryStore::new();
        let event = CriticalEvent::new("u1", MessageId::new("m1"), "autoagresion", "detalle");
        store.record(&event).unwrap();
        assert_eq!(store.critical_events("u1").unwrap(), vec![event]);
        assert!(store.critical_events("u2").unwrap().is_empty());
    }
}
