//! Response-affect annotation parsing.

use serde::{Deserialize, Serialize};

const EMOTION_KEY: &str = "emotion-response:";
const INTENSITY_KEY: &str = "intensity-response:";

/// Intensity of the tone the model chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
}

impl Intensity {
    /// Parses `low`, `medium` or `high` (also `baja`, `media`, `alta`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_matches(|c| c == '<' || c == '>').to_lowercase().as_str() {
            "low" | "baja" => Some(Self::Low),
            "medium" | "media" => Some(Self::Medium),
            "high" | "alta" => Some(Self::High),
            _ => None,
        }
    }

    /// Returns the intensity name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Tone annotation emitted by the completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseAffect {
    /// Emotion label the model reports answering with.
    pub emotion: Option<String>,
    /// Reported intensity.
    pub intensity: Option<Intensity>,
}

/// Splits a model reply into its visible text and the optional annotation.
///
/// Annotation lines are matched case-insensitively anywhere in the reply and
/// removed from the returned text. Missing or malformed lines are not an
/// error: the corresponding field is `None`, and the whole annotation is
/// `None` when neither line is present.
#[must_use]
pub fn parse_response_affect(reply: &str) -> (String, Option<ResponseAffect>) {
    let mut emotion = None;
    let mut intensity = None;
    let mut found = false;
    let mut visible: Vec<&str> = Vec::new();

    for line in reply.lines() {
        let trimmed = line.trim();
        if let Some(value) = strip_key(trimmed, EMOTION_KEY) {
            found = true;
            emotion = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        } else if let Some(value) = strip_key(trimmed, INTENSITY_KEY) {
            found = true;
            intensity = Intensity::parse(value);
        } else {
            visible.push(line);
        }
    }

    let text = visible.join("\n").trim_end().to_string();
    let affect = found.then_some(ResponseAffect { emotion, intensity });
    (text, affect)
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let head = line.get(..key.len())?;
    head.eq_ignore_ascii_case(key).then(|| &line[key.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotation() {
        let reply = "Entiendo que estés pasando por esto.\n\nemotion-response: empatía\nintensity-response: medium";
        let (text, affect) = parse_response_affect(reply);
        assert_eq!(text, "Entiendo que estés pasando por esto.");
        assert_eq!(
            affect,
            Some(ResponseAffect {
                emotion: Some("empatía".to_string()),
                intensity: Some(Intensity::Medium),
            })
        );
    }

    #[test]
    fn test_missing_annotation() {
        let (text, affect) = parse_response_affect("Solo texto.");
        assert_eq!(text, "Solo texto.");
        assert!(affect.is_none());
    }

    #[test]
    fn test_lenient_parsing() {
        let (_, affect) = parse_response_affect("hola\n  Emotion-Response: calma\nintensity-response: <extreme>");
        let affect = affect.unwrap();
        assert_eq!(affect.emotion.as_deref(), Some("calma"));
        assert_eq!(affect.intensity, None);
    }

    #[test]
    fn test_intensity_parse() {
        assert_eq!(Intensity::parse(" HIGH "), Some(Intensity::High));
        assert_eq!(Intensity::parse("<low>"), Some(Intensity::Low));
        assert_eq!(Intensity::parse("media"), Some(Intensity::Medium));
        assert_eq!(Intensity::parse("x"), None);
    }
}
