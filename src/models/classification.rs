//! Classifier output types.

use super::BaseEmotion;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single `(label, confidence)` pair from the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    /// Normalized base-emotion label.
    pub label: BaseEmotion,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f32,
}

impl EmotionScore {
    /// Creates a new score, clamping the confidence into `[0.0, 1.0]`.
    ///
    /// NaN is treated as zero confidence.
    #[must_use]
    pub fn new(label: BaseEmotion, score: f32) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self { label, score }
    }
}

/// Orders scores descending by confidence, then by canonical label order.
fn rank_order(a: &EmotionScore, b: &EmotionScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.label.cmp(&b.label))
}

/// Multi-label classification result.
///
/// Scores need not sum to 1. An empty result is legal and is treated as
/// emotional neutrality downstream, not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    scores: Vec<EmotionScore>,
}

impl ClassificationResult {
    /// Creates a result from raw scores (any order).
    #[must_use]
    pub const fn new(scores: Vec<EmotionScore>) -> Self {
        Self { scores }
    }

    /// Builds a result from `(label, score)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(BaseEmotion, f32)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(label, score)| EmotionScore::new(label, score))
                .collect(),
        )
    }

    /// Returns the scores in the order they were produced.
    #[must_use]
    pub fn scores(&self) -> &[EmotionScore] {
        &self.scores
    }

    /// Returns true when the classifier produced no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Returns every score ranked descending, ties broken by canonical order.
    #[must_use]
    pub fn ranked(&self) -> Vec<EmotionScore> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(rank_order);
        ranked
    }

    /// Returns the recognized scores ranked descending (`Other` discarded).
    #[must_use]
    pub fn ranked_recognized(&self) -> Vec<EmotionScore> {
        let mut ranked: Vec<EmotionScore> = self
            .scores
            .iter()
            .copied()
            .filter(|s| s.label.is_recognized())
            .collect();
        ranked.sort_by(rank_order);
        ranked
    }

    /// Returns the highest-scoring entry, `Other` included.
    #[must_use]
    pub fn dominant(&self) -> Option<EmotionScore> {
        self.scores.iter().copied().min_by(rank_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_descending() {
        let result = ClassificationResult::from_pairs(&[
            (BaseEmotion::Fear, 0.2),
            (BaseEmotion::Joy, 0.9),
            (BaseEmotion::Sadness, 0.5),
        ]);
        let labels: Vec<_> = result.ranked().iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![BaseEmotion::Joy, BaseEmotion::Sadness, BaseEmotion::Fear]
        );
    }

    #[test]
    fn test_tie_break_prefers_canonical_order() {
        let result = ClassificationResult::from_pairs(&[
            (BaseEmotion::Surprise, 0.4),
            (BaseEmotion::Anger, 0.4),
            (BaseEmotion::Sadness, 0.4),
        ]);
        let ranked = result.ranked();
        assert_eq!(ranked[0].label, BaseEmotion::Anger);
        assert_eq!(ranked[1].label, BaseEmotion::Sadness);
        assert_eq!(ranked[2].label, BaseEmotion::Surprise);
    }

    #[test]
    fn test_ranked_recognized_drops_other() {
        let result = ClassificationResult::from_pairs(&[
            (BaseEmotion::Other, 0.95),
            (BaseEmotion::Joy, 0.1),
        ]);
        let ranked = result.ranked_recognized();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, BaseEmotion::Joy);
        assert_eq!(result.dominant().map(|s| s.label), Some(BaseEmotion::Other));
    }

    #[test]
    fn test_score_clamped() {
        assert!((EmotionScore::new(BaseEmotion::Joy, 1.7).score - 1.0).abs() < f32::EPSILON);
        assert!(EmotionScore::new(BaseEmotion::Joy, f32::NAN).score.abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty() {
        let result = ClassificationResult::default();
        assert!(result.is_empty());
        assert!(result.dominant().is_none());
        assert!(result.ranked_recognized().is_empty());
    }
}
