//! Emotion classification.
//!
//! Wraps a pretrained multi-label emotion classifier. Backends return raw
//! `(label, score)` pairs; labels are remapped onto [`BaseEmotion`] before a
//! [`ClassificationResult`] leaves this module.
//!
//! The HTTP backend is expensive to build and safe to share, so the process
//! holds a single instance behind [`shared_classifier`].

mod http;

pub use http::HttpClassifier;

use crate::config::ClassifierConfig;
use crate::models::{BaseEmotion, ClassificationResult, EmotionScore};
use crate::{Error, Result};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Trait for emotion classifiers.
///
/// Implementations must be safe for concurrent use by multiple requests and
/// must not mutate shared state during inference.
pub trait EmotionClassifier: Send + Sync {
    /// The backend name.
    fn name(&self) -> &'static str;

    /// Classifies a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for empty text and
    /// [`Error::ClassifierUnavailable`] if the backend cannot answer.
    fn classify(&self, text: &str) -> Result<ClassificationResult>;
}

/// Process-wide classifier instance.
static SHARED_CLASSIFIER: OnceLock<Arc<HttpClassifier>> = OnceLock::new();

/// Returns the process-wide classifier, building it on first use.
///
/// The first call's configuration wins; later calls return the cached
/// instance regardless of the configuration passed.
///
/// # Errors
///
/// Returns [`Error::ClassifierUnavailable`] if the backend cannot be built.
pub fn shared_classifier(config: &ClassifierConfig) -> Result<Arc<HttpClassifier>> {
    if let Some(classifier) = SHARED_CLASSIFIER.get() {
        return Ok(Arc::clone(classifier));
    }

    tracing::info!(model = %config.model, "Loading emotion classifier (first use)...");
    let start = Instant::now();

    let classifier = HttpClassifier::from_config(config)?;

    tracing::info!(
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        model = %config.model,
        endpoint = %config.endpoint,
        "Emotion classifier ready"
    );

    // Another thread may have won the race; either instance is equivalent
    let _ = SHARED_CLASSIFIER.set(Arc::new(classifier));
    SHARED_CLASSIFIER
        .get()
        .map(Arc::clone)
        .ok_or_else(|| Error::ClassifierUnavailable {
            cause: "classifier initialization race".to_string(),
        })
}

/// Remaps raw backend labels onto base emotions.
///
/// Unknown labels become [`BaseEmotion::Other`]. When two raw labels map to
/// the same base emotion, the higher score is kept.
#[must_use]
pub fn remap_labels<S: AsRef<str>>(raw: &[(S, f32)]) -> ClassificationResult {
    let mut scores: Vec<EmotionScore> = Vec::with_capacity(raw.len());
    for (label, score) in raw {
        let candidate = EmotionScore::new(BaseEmotion::from_label(label.as_ref()), *score);
        match scores.iter_mut().find(|s| s.label == candidate.label) {
            Some(existing) if existing.score < candidate.score => *existing = candidate,
            Some(_) => {},
            None => scores.push(candidate),
        }
    }
    ClassificationResult::new(scores)
}
