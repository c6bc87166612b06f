//! Emotion normalization and affect mapping.
//!
//! Two independent consumers of a [`ClassificationResult`](crate::models::ClassificationResult):
//!
//! - [`EmotionNormalizer`] produces the extended label used for guidance
//!   lookup and prompt grounding, honoring crisis detection and keyword cues
//! - [`pet_affect`] produces the UI-facing affect from raw scores alone

mod normalizer;
mod pet;
mod tables;

pub use normalizer::{DEFAULT_MIN_CONFIDENCE, EmotionNormalizer, NormalizerInput};
pub use pet::pet_affect;
pub use tables::{
    EXTENDED_COMBINATIONS, ExtendedCombination, NEGATIVE_CUES, POSITIVE_CUES, combination_for,
};
