//! UI-facing pet affect.

use crate::models::{AffectTag, ClassificationResult};

/// Maps the highest-ranked recognized base emotion onto a pet affect.
///
/// Runs on the raw classification only: crisis detection and keyword cues
/// never reach it, so the pet may stay calm while the clinical label reads
/// as crisis. Defaults to [`AffectTag::Calm`].
#[must_use]
pub fn pet_affect(classification: &ClassificationResult) -> AffectTag {
    classification
        .ranked()
        .iter()
        .find_map(|score| AffectTag::for_base(score.label))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaseEmotion;
    use test_case::test_case;

    #[test_case(BaseEmotion::Joy, AffectTag::Joy; "joy")]
    #[test_case(BaseEmotion::Sadness, AffectTag::Understanding; "sadness")]
    #[test_case(BaseEmotion::Fear, AffectTag::Safety; "fear")]
    #[test_case(BaseEmotion::Anger, AffectTag::Calm; "anger")]
    #[test_case(BaseEmotion::Disgust, AffectTag::Calm; "disgust")]
    #[test_case(BaseEmotion::Surprise, AffectTag::Curiosity; "surprise")]
    fn test_dominant_label_mapping(base: BaseEmotion, expected: AffectTag) {
        let classification = ClassificationResult::from_pairs(&[(base, 0.8)]);
        assert_eq!(pet_affect(&classification), expected);
    }

    #[test]
    fn test_skips_other() {
        let classification = ClassificationResult::from_pairs(&[
            (BaseEmotion::Other, 0.9),
            (BaseEmotion::Fear, 0.05),
        ]);
        assert_eq!(pet_affect(&classification), AffectTag::Safety);
    }

    #[test]
    fn test_no_threshold_applied() {
        let classification = ClassificationResult::from_pairs(&[(BaseEmotion::Surprise, 0.01)]);
        assert_eq!(pet_affect(&classification), AffectTag::Curiosity);
    }

    #[test]
    fn test_defaults_to_calm() {
        assert_eq!(pet_affect(&ClassificationResult::default()), AffectTag::Calm);
        let only_other = ClassificationResult::from_pairs(&[(BaseEmotion::Other, 1.0)]);
        assert_eq!(pet_affect(&only_other), AffectTag::Calm);
    }
}
