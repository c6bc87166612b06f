//! Crisis reference phrases.
//!
//! Static phrase data for crisis detection. The set must stay in the tens:
//! every phrase costs a similarity pass over the whole message.

use std::sync::LazyLock;

/// Curated high-risk phrases (self-harm, suicidal ideation, emotional crisis).
pub const CRITICAL_PATTERNS: &[&str] = &[
    "me quiero morir",
    "me quiero suicidar",
    "me quiero matar",
    "me quiero autodesvivir",
    "me quiero hacer daño",
    "ya no quiero vivir",
    "no vale la pena vivir",
    "quiero acabar con todo",
    "suicidarme",
    "matarme",
    "morirme",
    "quitarme la vida",
    "hacerme daño",
    "autoagresión",
    "no quiero seguir",
    "quiero lastimarme",
    "siento que no hay salida",
    "no puedo más",
    "no quiero estar aquí",
    "quiero terminar con todo",
    "no quiero continuar",
    "quiero hacerme daño físico",
    "no puedo soportarlo más",
    "quiero morir",
    "quiero suicidarme",
];

/// Lowercases and collapses every run of whitespace to a single space.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A normalized reference phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisPattern {
    phrase: String,
    words: Vec<String>,
}

impl CrisisPattern {
    /// Normalizes a raw phrase. Returns `None` for blank phrases, which would
    /// otherwise match every message.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let phrase = normalize_text(raw);
        if phrase.is_empty() {
            return None;
        }
        let words = phrase.split(' ').map(str::to_string).collect();
        Some(Self { phrase, words })
    }

    /// Returns the normalized phrase.
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Returns the phrase's words.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// The built-in phrase set, normalized once on first use.
pub static DEFAULT_PATTERNS: LazyLock<Vec<CrisisPattern>> = LazyLock::new(|| {
    CRITICAL_PATTERNS
        .iter()
        .filter_map(|raw| CrisisPattern::new(raw))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  ME    QUIERO\tMORIR \n"), "me quiero morir");
    }

    #[test]
    fn test_blank_pattern_rejected() {
        assert!(CrisisPattern::new("   ").is_none());
    }

    #[test]
    fn test_default_patterns_loaded() {
        assert_eq!(DEFAULT_PATTERNS.len(), CRITICAL_PATTERNS.len());
        assert!(DEFAULT_PATTERNS.len() < 100);
        let pattern = &DEFAULT_PATTERNS[0];
        assert_eq!(pattern.words(), ["me", "quiero", "morir"]);
    }
}
