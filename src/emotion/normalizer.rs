//! Emotion normalization.
//!
//! Maps classifier output plus the crisis signal onto the extended emotion
//! vocabulary through an ordered decision table. Each rule is a guard that
//! either yields a label or passes; the first rule that yields wins.

use super::tables::{NEGATIVE_CUE_PATTERN, POSITIVE_CUE_PATTERN, combination_for};
use crate::models::{
    BaseEmotion, ClassificationResult, EmotionScore, ExtendedEmotion, NormalizationRule,
};
use crate::{Error, Result};

/// Default minimum confidence for trusting the top classifier label.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;

/// Inputs to one normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizerInput<'a> {
    /// Recognized labels ranked descending (`Other` already discarded).
    pub ranked: &'a [EmotionScore],
    /// Crisis detector verdict.
    pub crisis: bool,
    /// Raw message text.
    pub text: &'a str,
}

type Guard = fn(&EmotionNormalizer, &NormalizerInput<'_>) -> Option<ExtendedEmotion>;

/// One row of the decision table.
#[derive(Clone, Copy)]
struct Rule {
    name: NormalizationRule,
    guard: Guard,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name.as_str())
    }
}

/// Default rule order.
const DEFAULT_RULES: &[Rule] = &[
    Rule { name: NormalizationRule::CrisisOverride, guard: EmotionNormalizer::crisis_override },
    Rule { name: NormalizationRule::PositiveCue, guard: EmotionNormalizer::positive_cue },
    Rule { name: NormalizationRule::NegativeCue, guard: EmotionNormalizer::negative_cue },
    Rule { name: NormalizationRule::TopLabel, guard: EmotionNormalizer::top_label },
    Rule { name: NormalizationRule::LowConfidence, guard: EmotionNormalizer::low_confidence },
    Rule { name: NormalizationRule::Combination, guard: EmotionNormalizer::combination },
];

/// Rule order when combinations take precedence over single labels.
const COMBINATION_FIRST_RULES: &[Rule] = &[
    Rule { name: NormalizationRule::CrisisOverride, guard: EmotionNormalizer::crisis_override },
    Rule { name: NormalizationRule::PositiveCue, guard: EmotionNormalizer::positive_cue },
    Rule { name: NormalizationRule::NegativeCue, guard: EmotionNormalizer::negative_cue },
    Rule { name: NormalizationRule::Combination, guard: EmotionNormalizer::combination },
    Rule { name: NormalizationRule::TopLabel, guard: EmotionNormalizer::top_label },
    Rule { name: NormalizationRule::LowConfidence, guard: EmotionNormalizer::low_confidence },
];

/// Deterministic emotion normalizer.
///
/// Never returns `otros`; identical inputs always yield identical output.
#[derive(Debug, Clone)]
pub struct EmotionNormalizer {
    min_confidence: f32,
    rules: &'static [Rule],
}

impl EmotionNormalizer {
    /// Creates a normalizer with the default threshold and rule order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            rules: DEFAULT_RULES,
        }
    }

    /// Sets the minimum confidence for the top label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the value is outside `[0.0, 1.0]`.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(Error::InvalidInput(format!(
                "minimum confidence must be within [0, 1], got {min_confidence}"
            )));
        }
        self.min_confidence = min_confidence;
        Ok(self)
    }

    /// Evaluates the combination rule before the single-label rules.
    #[must_use]
    pub const fn with_combinations_first(mut self, enabled: bool) -> Self {
        self.rules = if enabled {
            COMBINATION_FIRST_RULES
        } else {
            DEFAULT_RULES
        };
        self
    }

    /// Returns the configured minimum confidence.
    #[must_use]
    pub const fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Normalizes a classification into an extended emotion.
    #[must_use]
    pub fn normalize(
        &self,
        classification: &ClassificationResult,
        crisis: bool,
        text: &str,
    ) -> ExtendedEmotion {
        self.normalize_with_rule(classification, crisis, text).0
    }

    /// Normalizes and reports which rule fired.
    #[must_use]
    pub fn normalize_with_rule(
        &self,
        classification: &ClassificationResult,
        crisis: bool,
        text: &str,
    ) -> (ExtendedEmotion, NormalizationRule) {
        let ranked = classification.ranked_recognized();
        let input = NormalizerInput {
            ranked: &ranked,
            crisis,
            text,
        };

        let (emotion, rule) = self
            .rules
            .iter()
            .find_map(|rule| (rule.guard)(self, &input).map(|emotion| (emotion, rule.name)))
            .unwrap_or_else(|| (ExtendedEmotion::calm(), NormalizationRule::Fallback));

        metrics::counter!("emotion_normalized_total", "rule" => rule.as_str()).increment(1);
        tracing::debug!(emotion = %emotion, rule = rule.as_str(), "Emotion normalized");
        (emotion, rule)
    }

    /// Crisis detected: the crisis label overrides everything.
    #[must_use]
    pub const fn crisis_override(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        if input.crisis {
            Some(ExtendedEmotion::crisis())
        } else {
            None
        }
    }

    /// A positive cue word maps to joy.
    #[must_use]
    pub fn positive_cue(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        POSITIVE_CUE_PATTERN
            .is_match(input.text)
            .then(|| ExtendedEmotion::from_base(BaseEmotion::Joy))
    }

    /// A negative cue word maps to sadness.
    #[must_use]
    pub fn negative_cue(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        NEGATIVE_CUE_PATTERN
            .is_match(input.text)
            .then(|| ExtendedEmotion::from_base(BaseEmotion::Sadness))
    }

    /// The top label at or above the minimum confidence maps directly.
    #[must_use]
    pub fn top_label(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        input
            .ranked
            .first()
            .filter(|top| top.score >= self.min_confidence)
            .map(|top| ExtendedEmotion::from_base(top.label))
    }

    /// A top label below the minimum confidence reads as calm.
    #[must_use]
    pub fn low_confidence(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        input
            .ranked
            .first()
            .filter(|top| top.score < self.min_confidence)
            .map(|_| ExtendedEmotion::calm())
    }

    /// The top-2 labels, as an unordered pair, match a registered combination.
    ///
    /// Both labels must reach the minimum confidence.
    #[must_use]
    pub fn combination(&self, input: &NormalizerInput<'_>) -> Option<ExtendedEmotion> {
        let [first, second, ..] = input.ranked else {
            return None;
        };
        if second.score < self.min_confidence {
            return None;
        }
        combination_for(first.label, second.label).map(super::tables::ExtendedCombination::emotion)
    }
}

impl Default for EmotionNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CRISIS_LABEL;
    use test_case::test_case;

    fn classification(pairs: &[(BaseEmotion, f32)]) -> ClassificationResult {
        ClassificationResult::from_pairs(pairs)
    }

    fn strong_joy() -> ClassificationResult {
        classification(&[
            (BaseEmotion::Joy, 0.92),
            (BaseEmotion::Surprise, 0.05),
            (BaseEmotion::Other, 0.02),
        ])
    }

    fn uniformly_low() -> ClassificationResult {
        classification(&[
            (BaseEmotion::Anger, 0.1),
            (BaseEmotion::Disgust, 0.05),
            (BaseEmotion::Fear, 0.12),
            (BaseEmotion::Joy, 0.2),
            (BaseEmotion::Sadness, 0.15),
            (BaseEmotion::Surprise, 0.08),
            (BaseEmotion::Other, 0.25),
        ])
    }

    #[test]
    fn test_crisis_overrides_classifier() {
        let normalizer = EmotionNormalizer::new();
        let (emotion, rule) = normalizer.normalize_with_rule(&strong_joy(), true, "estoy feliz");
        assert_eq!(emotion.as_str(), CRISIS_LABEL);
        assert_eq!(rule, NormalizationRule::CrisisOverride);
    }

    #[test]
    fn test_positive_cue_beats_classifier() {
        let sad = classification(&[(BaseEmotion::Sadness, 0.9)]);
        let (emotion, rule) =
            EmotionNormalizer::new().normalize_with_rule(&sad, false, "Todo salió genial");
        assert_eq!(emotion.as_str(), "alegria");
        assert_eq!(rule, NormalizationRule::PositiveCue);
    }

    #[test]
    fn test_positive_cue_checked_before_negative() {
        let emotion =
            EmotionNormalizer::new().normalize(&uniformly_low(), false, "ni bien ni mal");
        assert_eq!(emotion.as_str(), "alegria");
    }

    #[test]
    fn test_negative_cue() {
        let (emotion, rule) = EmotionNormalizer::new().normalize_with_rule(
            &strong_joy(),
            false,
            "estoy harto",
        );
        assert_eq!(emotion.as_str(), "tristeza");
        assert_eq!(rule, NormalizationRule::NegativeCue);
    }

    #[test_case("siento mucha tristeza", "tristeza"; "triste inside tristeza")]
    #[test_case("tengo un malestar enorme", "tristeza"; "mal inside malestar")]
    #[test_case("también lo pensé", "alegria"; "bien inside tambien")]
    #[test_case("estoy malísimo", "tristeza"; "mal inside malisimo")]
    fn test_cues_match_inside_words(text: &str, expected: &str) {
        let fear = classification(&[(BaseEmotion::Fear, 0.8)]);
        assert_eq!(EmotionNormalizer::new().normalize(&fear, false, text).as_str(), expected);
    }

    #[test]
    fn test_top_label_mapped() {
        let fear = classification(&[(BaseEmotion::Fear, 0.6), (BaseEmotion::Sadness, 0.3)]);
        let (emotion, rule) =
            EmotionNormalizer::new().normalize_with_rule(&fear, false, "tengo un examen mañana");
        assert_eq!(emotion.as_str(), "miedo");
        assert_eq!(rule, NormalizationRule::TopLabel);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let edge = classification(&[(BaseEmotion::Surprise, 0.3)]);
        assert_eq!(
            EmotionNormalizer::new().normalize(&edge, false, "vaya").as_str(),
            "sorpresa"
        );
    }

    #[test]
    fn test_low_confidence_is_calm() {
        let (emotion, rule) =
            EmotionNormalizer::new().normalize_with_rule(&uniformly_low(), false, "no sé qué decir");
        assert_eq!(emotion.as_str(), "tranquilidad");
        assert_eq!(rule, NormalizationRule::LowConfidence);
    }

    #[test]
    fn test_other_is_discarded_before_ranking() {
        let mostly_other = classification(&[(BaseEmotion::Other, 0.99), (BaseEmotion::Anger, 0.4)]);
        assert_eq!(
            EmotionNormalizer::new().normalize(&mostly_other, false, "uf").as_str(),
            "enojo"
        );
    }

    #[test]
    fn test_empty_classification_falls_back() {
        let (emotion, rule) = EmotionNormalizer::new().normalize_with_rule(
            &ClassificationResult::default(),
            false,
            "...",
        );
        assert_eq!(emotion.as_str(), "tranquilidad");
        assert_eq!(rule, NormalizationRule::Fallback);
    }

    #[test]
    fn test_only_other_falls_back() {
        let only_other = classification(&[(BaseEmotion::Other, 0.8)]);
        let emotion = EmotionNormalizer::new().normalize(&only_other, false, "ok");
        assert_eq!(emotion.as_str(), "tranquilidad");
    }

    #[test]
    fn test_tie_break_uses_canonical_order() {
        let tie = classification(&[(BaseEmotion::Sadness, 0.5), (BaseEmotion::Anger, 0.5)]);
        assert_eq!(
            EmotionNormalizer::new().normalize(&tie, false, "uf").as_str(),
            "enojo"
        );
    }

    #[test]
    fn test_combination_unreachable_in_default_order() {
        let pair = classification(&[(BaseEmotion::Anger, 0.6), (BaseEmotion::Disgust, 0.5)]);
        let (emotion, rule) = EmotionNormalizer::new().normalize_with_rule(&pair, false, "uf");
        assert_eq!(emotion.as_str(), "enojo");
        assert_eq!(rule, NormalizationRule::TopLabel);
    }

    #[test]
    fn test_combination_first() {
        let pair = classification(&[(BaseEmotion::Anger, 0.6), (BaseEmotion::Disgust, 0.5)]);
        let normalizer = EmotionNormalizer::new().with_combinations_first(true);
        let (emotion, rule) = normalizer.normalize_with_rule(&pair, false, "uf");
        assert_eq!(emotion.as_str(), "ira");
        assert_eq!(rule, NormalizationRule::Combination);
    }

    #[test]
    fn test_combination_requires_confident_second_label() {
        let pair = classification(&[(BaseEmotion::Anger, 0.6), (BaseEmotion::Disgust, 0.1)]);
        let normalizer = EmotionNormalizer::new().with_combinations_first(true);
        assert_eq!(normalizer.normalize(&pair, false, "uf").as_str(), "enojo");
    }

    #[test]
    fn test_combination_guard_never_yields_crisis() {
        let ranked = [
            EmotionScore::new(BaseEmotion::Sadness, 0.7),
            EmotionScore::new(BaseEmotion::Fear, 0.6),
        ];
        let input = NormalizerInput {
            ranked: &ranked,
            crisis: false,
            text: "",
        };
        let emotion = EmotionNormalizer::new().combination(&input).unwrap();
        assert_eq!(emotion.as_str(), "culpa");
    }

    #[test]
    fn test_custom_min_confidence() {
        let normalizer = EmotionNormalizer::new().with_min_confidence(0.7).unwrap();
        let fear = classification(&[(BaseEmotion::Fear, 0.6)]);
        assert_eq!(normalizer.normalize(&fear, false, "hmm").as_str(), "tranquilidad");
        assert!(EmotionNormalizer::new().with_min_confidence(1.2).is_err());
    }

    #[test]
    fn test_idempotent() {
        let normalizer = EmotionNormalizer::new();
        let input = uniformly_low();
        let first = normalizer.normalize(&input, false, "algo pasa");
        let second = normalizer.normalize(&input, false, "algo pasa");
        assert_eq!(first, second);
    }
}
