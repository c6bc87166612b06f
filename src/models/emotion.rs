//! Emotion vocabularies.
//!
//! Three label sets live here:
//!
//! - [`BaseEmotion`]: the closed six-way taxonomy produced by the classifier,
//!   plus an `Other` catch-all.
//! - [`ExtendedEmotion`]: the domain vocabulary used to look up therapeutic
//!   guidance (techniques and warnings).
//! - [`AffectTag`]: the small UI-facing vocabulary for the companion pet.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Base emotion produced directly by the classification model.
///
/// Variant order is the canonical taxonomy order and is used as the
/// tie-break when two labels share a score (earlier wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseEmotion {
    /// Anger (`enojo`).
    Anger,
    /// Disgust (`asco`).
    Disgust,
    /// Fear (`miedo`).
    Fear,
    /// Joy (`alegria`).
    Joy,
    /// Sadness (`tristeza`).
    Sadness,
    /// Surprise (`sorpresa`).
    Surprise,
    /// Catch-all for labels outside the six-way taxonomy.
    Other,
}

impl BaseEmotion {
    /// Returns the six recognized base emotions in canonical order.
    #[must_use]
    pub const fn recognized() -> &'static [Self] {
        &[
            Self::Anger,
            Self::Disgust,
            Self::Fear,
            Self::Joy,
            Self::Sadness,
            Self::Surprise,
        ]
    }

    /// Returns the model-facing English name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anger => "anger",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Surprise => "surprise",
            Self::Other => "other",
        }
    }

    /// Returns the domain-language (Spanish) label.
    #[must_use]
    pub const fn domain_label(&self) -> &'static str {
        match self {
            Self::Anger => "enojo",
            Self::Disgust => "asco",
            Self::Fear => "miedo",
            Self::Joy => "alegria",
            Self::Sadness => "tristeza",
            Self::Surprise => "sorpresa",
            Self::Other => "otros",
        }
    }

    /// Returns true for the six labels of the taxonomy.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Parses a raw classifier label.
    ///
    /// Accepts opaque model codes (`LABEL_0`..`LABEL_5`), English names and
    /// Spanish domain names, case-insensitively. Returns `None` for anything
    /// else; callers decide whether that becomes [`BaseEmotion::Other`].
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "label_0" | "anger" | "enojo" => Some(Self::Anger),
            "label_1" | "disgust" | "asco" => Some(Self::Disgust),
            "label_2" | "fear" | "miedo" => Some(Self::Fear),
            "label_3" | "joy" | "alegria" | "alegría" => Some(Self::Joy),
            "label_4" | "sadness" | "tristeza" => Some(Self::Sadness),
            "label_5" | "surprise" | "sorpresa" => Some(Self::Surprise),
            "other" | "others" | "otros" => Some(Self::Other),
            _ => None,
        }
    }

    /// Parses a raw classifier label, folding unknown labels into `Other`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or(Self::Other)
    }
}

impl fmt::Display for BaseEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label of the crisis / suicidal-ideation extended emotion.
pub const CRISIS_LABEL: &str = "crisis emocional / ideacion suicida";

/// Label of the self-harm extended emotion.
pub const SELF_HARM_LABEL: &str = "autoagresion";

/// Label used for calm / emotional neutrality.
pub const CALM_LABEL: &str = "tranquilidad";

/// Extended labels that trigger a critical event when produced.
pub const HIGH_SEVERITY_LABELS: &[&str] = &[SELF_HARM_LABEL, CRISIS_LABEL];

/// Extended emotion drawn from the guidance vocabulary.
///
/// The vocabulary is open-ended (it mirrors whatever the guidance store
/// holds), so this is a string newtype rather than an enum. Well-known labels
/// are borrowed statics; anything read back from storage is owned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtendedEmotion(Cow<'static, str>);

impl ExtendedEmotion {
    /// Creates an extended emotion from a static label.
    #[must_use]
    pub const fn from_static(label: &'static str) -> Self {
        Self(Cow::Borrowed(label))
    }

    /// Creates an extended emotion from an owned label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(Cow::Owned(label.into()))
    }

    /// The crisis / suicidal-ideation label.
    #[must_use]
    pub const fn crisis() -> Self {
        Self::from_static(CRISIS_LABEL)
    }

    /// The calm / neutral label.
    #[must_use]
    pub const fn calm() -> Self {
        Self::from_static(CALM_LABEL)
    }

    /// Maps a base emotion onto its direct extended counterpart.
    ///
    /// `Other` maps to calm: the normalizer never surfaces `otros`.
    #[must_use]
    pub const fn from_base(base: BaseEmotion) -> Self {
        match base {
            BaseEmotion::Other => Self::calm(),
            other => Self::from_static(other.domain_label()),
        }
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this label must raise a critical event.
    #[must_use]
    pub fn is_high_severity(&self) -> bool {
        HIGH_SEVERITY_LABELS.contains(&self.as_str())
    }

    /// Returns true for the crisis label.
    #[must_use]
    pub fn is_crisis(&self) -> bool {
        self.as_str() == CRISIS_LABEL
    }
}

impl fmt::Display for ExtendedEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExtendedEmotion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ExtendedEmotion {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// UI-facing affect for the companion pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectTag {
    /// Calm.
    #[default]
    Calm,
    /// Safety / reassurance.
    Safety,
    /// Joy.
    Joy,
    /// Understanding / compassion.
    Understanding,
    /// Curiosity.
    Curiosity,
}

impl AffectTag {
    /// Returns the tag name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Safety => "safety",
            Self::Joy => "joy",
            Self::Understanding => "understanding",
            Self::Curiosity => "curiosity",
        }
    }

    /// Returns the asset key used by the companion skins.
    #[must_use]
    pub const fn asset_key(&self) -> &'static str {
        match self {
            Self::Calm => "calma",
            Self::Safety => "seguridad",
            Self::Joy => "alegria",
            Self::Understanding => "comprension",
            Self::Curiosity => "curiosidad",
        }
    }

    /// Maps a recognized base emotion onto its affect. `Other` has none.
    #[must_use]
    pub const fn for_base(base: BaseEmotion) -> Option<Self> {
        match base {
            BaseEmotion::Joy => Some(Self::Joy),
            BaseEmotion::Sadness => Some(Self::Understanding),
            BaseEmotion::Fear => Some(Self::Safety),
            BaseEmotion::Anger | BaseEmotion::Disgust => Some(Self::Calm),
            BaseEmotion::Surprise => Some(Self::Curiosity),
            BaseEmotion::Other => None,
        }
    }
}

impl fmt::Display for AffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("LABEL_0", BaseEmotion::Anger; "code anger")]
    #[test_case("LABEL_3", BaseEmotion::Joy; "code joy")]
    #[test_case("label_5", BaseEmotion::Surprise; "lowercase code")]
    #[test_case("sadness", BaseEmotion::Sadness; "english name")]
    #[test_case("Alegría", BaseEmotion::Joy; "accented spanish")]
    #[test_case("miedo", BaseEmotion::Fear; "spanish name")]
    #[test_case("others", BaseEmotion::Other; "others")]
    #[test_case("LABEL_9", BaseEmotion::Other; "unknown code")]
    fn test_from_label(raw: &str, expected: BaseEmotion) {
        assert_eq!(BaseEmotion::from_label(raw), expected);
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(BaseEmotion::parse("nostalgia"), None);
    }

    #[test]
    fn test_canonical_order() {
        assert!(BaseEmotion::Anger < BaseEmotion::Disgust);
        assert!(BaseEmotion::Sadness < BaseEmotion::Surprise);
        assert!(BaseEmotion::Surprise < BaseEmotion::Other);
    }

    #[test]
    fn test_from_base_never_other() {
        assert_eq!(ExtendedEmotion::from_base(BaseEmotion::Other), ExtendedEmotion::calm());
        assert_eq!(ExtendedEmotion::from_base(BaseEmotion::Joy).as_str(), "alegria");
    }

    #[test]
    fn test_high_severity() {
        assert!(ExtendedEmotion::crisis().is_high_severity());
        assert!(ExtendedEmotion::from("autoagresion").is_high_severity());
        assert!(!ExtendedEmotion::from("duelo").is_high_severity());
        assert!(!ExtendedEmotion::calm().is_high_severity());
    }

    #[test]
    fn test_owned_and_static_compare_equal() {
        assert_eq!(ExtendedEmotion::new(CRISIS_LABEL), ExtendedEmotion::crisis());
    }

    #[test]
    fn test_affect_for_base() {
        assert_eq!(AffectTag::for_base(BaseEmotion::Joy), Some(AffectTag::Joy));
        assert_eq!(AffectTag::for_base(BaseEmotion::Other), None);
        assert_eq!(AffectTag::Understanding.asset_key(), "comprension");
    }
}
