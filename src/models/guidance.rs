//! Therapeutic guidance and critical events.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::MessageId;

/// Placeholder used when no techniques are registered for an emotion.
pub const NO_TECHNIQUES: &str = "No hay técnicas recomendadas.";

/// Placeholder used when no warnings are registered for an emotion.
pub const NO_WARNINGS: &str = "No hay advertencias registradas.";

/// Techniques and warnings registered for an extended emotion.
///
/// Either field may be absent in storage; [`Guidance::resolve`] substitutes
/// the placeholders so a guidance miss never fails a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    /// Recommended practical techniques.
    pub techniques: Option<String>,
    /// Warnings the assistant must respect.
    pub warnings: Option<String>,
}

impl Guidance {
    /// Creates guidance with both fields set.
    #[must_use]
    pub fn new(techniques: impl Into<String>, warnings: impl Into<String>) -> Self {
        Self {
            techniques: Some(techniques.into()),
            warnings: Some(warnings.into()),
        }
    }

    /// Resolves an optional lookup into `(techniques, warnings)` text.
    #[must_use]
    pub fn resolve(found: Option<Self>) -> (String, String) {
        let found = found.unwrap_or_default();
        let techniques = found
            .techniques
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| NO_TECHNIQUES.to_string());
        let warnings = found
            .warnings
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| NO_WARNINGS.to_string());
        (techniques, warnings)
    }
}

/// Alert level of a critical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Low.
    Bajo,
    /// Medium.
    Medio,
    /// High.
    #[default]
    Alto,
}

impl AlertLevel {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bajo => "bajo",
            Self::Medio => "medio",
            Self::Alto => "alto",
        }
    }

    /// Parses a stored alert level.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bajo" | "low" => Some(Self::Bajo),
            "medio" | "medium" => Some(Self::Medio),
            "alto" | "high" => Some(Self::Alto),
            _ => None,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A high-severity event raised for human follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalEvent {
    /// Owner of the conversation.
    pub user_id: String,
    /// Message that triggered the event.
    pub message_id: MessageId,
    /// Event type (the extended emotion label).
    pub event_type: String,
    /// Free-text description.
    pub description: String,
    /// Alert level.
    pub alert_level: AlertLevel,
    /// Whether someone has attended to the event.
    pub handled: bool,
}

impl CriticalEvent {
    /// Creates an unhandled, high-alert event.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        message_id: MessageId,
        event_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message_id,
            event_type: event_type.into(),
            description: description.into(),
            alert_level: AlertLevel::default(),
            handled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_miss_uses_placeholders() {
        let (techniques, warnings) = Guidance::resolve(None);
        assert_eq!(techniques, NO_TECHNIQUES);
        assert_eq!(warnings, NO_WARNINGS);
    }

    #[test]
    fn test_resolve_partial_row() {
        let found = Guidance {
            techniques: Some("respiración 4-7-8".to_string()),
            warnings: Some("   ".to_string()),
        };
        let (techniques, warnings) = Guidance::resolve(Some(found));
        assert_eq!(techniques, "respiración 4-7-8");
        assert_eq!(warnings, NO_WARNINGS);
    }

    #[test]
    fn test_event_defaults() {
        let event = CriticalEvent::new("u1", MessageId::from("m1"), "autoagresion", "desc");
        assert_eq!(event.alert_level, AlertLevel::Alto);
        assert!(!event.handled);
    }
}
