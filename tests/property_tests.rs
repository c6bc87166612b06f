//! Property-based tests for detection, normalization and windowing.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Crisis detection ignores case and whitespace layout
//! - Sequence similarity stays within `[0, 1]` and is reflexive
//! - The normalizer never surfaces `otros` and is deterministic
//! - History windows alternate roles and respect the length bound

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use aimind::crisis::{CRITICAL_PATTERNS, CrisisDetector, sequence_ratio};
use aimind::emotion::EmotionNormalizer;
use aimind::history::{alternate, build_window};
use aimind::models::{
    BaseEmotion, ClassificationResult, ConversationTurn, NewMessage, Role, UNLABELED_EMOTION,
};
use aimind::storage::{InMemoryStore, MessageStore};
use proptest::prelude::*;

fn base_emotion() -> impl Strategy<Value = BaseEmotion> {
    prop::sample::select(vec![
        BaseEmotion::Anger,
        BaseEmotion::Disgust,
        BaseEmotion::Fear,
        BaseEmotion::Joy,
        BaseEmotion::Sadness,
        BaseEmotion::Surprise,
        BaseEmotion::Other,
    ])
}

fn classification() -> impl Strategy<Value = ClassificationResult> {
    prop::collection::vec((base_emotion(), 0.0f32..=1.0), 0..8)
        .prop_map(|pairs| ClassificationResult::from_pairs(&pairs))
}

fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![Role::User, Role::Assistant])
}

/// Re-lays out text with mixed case and irregular whitespace.
fn scramble(text: &str, upper: bool) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| if upper { w.to_uppercase() } else { w.to_string() })
        .collect();
    format!("  {}\t", words.join(" \n  "))
}

proptest! {
    /// Property: listed phrases match regardless of case and spacing.
    #[test]
    fn prop_listed_phrases_always_detected(
        idx in 0..CRITICAL_PATTERNS.len(),
        upper in any::<bool>(),
        prefix in "[a-z ]{0,20}",
    ) {
        let detector = CrisisDetector::new();
        let text = format!("{prefix} {}", scramble(CRITICAL_PATTERNS[idx], upper));
        prop_assert!(detector.detect(&text));
    }

    /// Property: detection is invariant under case and whitespace changes.
    #[test]
    fn prop_detect_case_whitespace_insensitive(text in "[a-záéíóúñ ]{0,60}") {
        let detector = CrisisDetector::new();
        prop_assert_eq!(
            detector.detect(&text),
            detector.detect(&scramble(&text, true))
        );
    }

    /// Property: similarity is bounded and reflexive.
    #[test]
    fn prop_sequence_ratio_bounds(a in ".{0,40}", b in ".{0,40}") {
        let ratio = sequence_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ratio));
        prop_assert!((sequence_ratio(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    /// Property: the normalizer never returns the catch-all label.
    #[test]
    fn prop_normalizer_never_returns_other(
        classification in classification(),
        crisis in any::<bool>(),
        text in "[a-z ]{0,30}",
        combinations_first in any::<bool>(),
    ) {
        let normalizer = EmotionNormalizer::new().with_combinations_first(combinations_first);
        let emotion = normalizer.normalize(&classification, crisis, &text);
        prop_assert_ne!(emotion.as_str(), UNLABELED_EMOTION);
        prop_assert_ne!(emotion.as_str(), "other");
        prop_assert!(!emotion.as_str().is_empty());
    }

    /// Property: normalization is deterministic.
    #[test]
    fn prop_normalizer_idempotent(
        classification in classification(),
        crisis in any::<bool>(),
        text in "[a-z ]{0,30}",
    ) {
        let normalizer = EmotionNormalizer::new();
        prop_assert_eq!(
            normalizer.normalize_with_rule(&classification, crisis, &text),
            normalizer.normalize_with_rule(&classification, crisis, &text)
        );
    }

    /// Property: the crisis flag always wins.
    #[test]
    fn prop_crisis_flag_overrides(classification in classification(), text in "[a-z ]{0,30}") {
        let emotion = EmotionNormalizer::new().normalize(&classification, true, &text);
        prop_assert!(emotion.is_crisis());
    }

    /// Property: alternation never yields two adjacent same-role turns.
    #[test]
    fn prop_alternate_never_repeats_roles(roles in prop::collection::vec(role(), 0..40)) {
        let turns: Vec<ConversationTurn> = roles
            .iter()
            .enumerate()
            .map(|(i, r)| ConversationTurn::new(*r, format!("turno {i}")))
            .collect();
        let window = alternate(turns.clone());

        prop_assert!(window.len() <= turns.len());
        prop_assert!(window.windows(2).all(|w| w[0].role != w[1].role));
    }

    /// Property: the built window is bounded by twice the pair count.
    #[test]
    fn prop_window_bounded(
        roles in prop::collection::vec(role(), 0..30),
        max_pairs in 0usize..6,
    ) {
        let store = InMemoryStore::new();
        for (i, r) in roles.iter().enumerate() {
            store.append(&NewMessage::new("u", *r, format!("m{i}"))).unwrap();
        }

        let window = build_window(&store, "u", max_pairs).unwrap();
        prop_assert!(window.len() <= 2 * max_pairs);
        prop_assert!(window.windows(2).all(|w| w[0].role != w[1].role));
    }
}
