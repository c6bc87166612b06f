//! Conversation turns and message identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Creates a message ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, time-ordered message ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the assistant.
    User,
    /// The assistant.
    Assistant,
}

impl Role {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Returns the localized speaker name used in prompts.
    #[must_use]
    pub const fn localized(&self) -> &'static str {
        match self {
            Self::User => "Usuario",
            Self::Assistant => "Asistente",
        }
    }

    /// Parses a stored role string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" | "usuario" => Some(Self::User),
            "assistant" | "asistente" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn of conversation as seen by prompt construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Speaker.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

impl ConversationTurn {
    /// Creates a new turn.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A message to append to the message store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Pre-assigned identifier, or `None` to let the store generate one.
    pub id: Option<MessageId>,
    /// Owner of the conversation.
    pub user_id: String,
    /// Speaker.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Extended emotion detected for the turn, if any.
    pub emotion: Option<String>,
    /// Model (or `"usuario"`) that produced the message.
    pub model_used: Option<String>,
}

impl NewMessage {
    /// Creates a message with no emotion or model annotation.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            role,
            content: content.into(),
            emotion: None,
            model_used: None,
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the detected emotion.
    #[must_use]
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    /// Sets the producing model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }
}

/// Number of user messages attributed to one emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    /// Extended emotion label, or `otros` when none was recorded.
    pub emotion: String,
    /// Message count.
    pub count: u64,
}

/// Label used for messages stored without an emotion.
pub const UNLABELED_EMOTION: &str = "otros";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::User, Role::Assistant] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("system"), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(MessageId::generate(), MessageId::generate());
    }

    #[test]
    fn test_new_message_builder() {
        let msg = NewMessage::new("u1", Role::User, "hola")
            .with_emotion("alegria")
            .with_model("usuario");
        assert_eq!(msg.emotion.as_deref(), Some("alegria"));
        assert_eq!(msg.model_used.as_deref(), Some("usuario"));
        assert!(msg.id.is_none());
    }
}
