//! Phrase-based crisis detection.

use super::patterns::{CrisisPattern, DEFAULT_PATTERNS, normalize_text};
use super::similarity::sequence_ratio;
use crate::{Error, Result};
use std::borrow::Cow;

/// Default sequence-similarity threshold for fuzzy matches.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// How a reference phrase matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The phrase appears verbatim.
    Exact,
    /// Whole-message similarity cleared the threshold.
    Fuzzy,
    /// Every word of the phrase appears somewhere in the message.
    WordSubset,
}

impl MatchKind {
    /// Returns the kind name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::WordSubset => "word_subset",
        }
    }
}

/// A matched reference phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct CrisisMatch<'a> {
    /// The normalized phrase that matched.
    pub phrase: &'a str,
    /// Which rule matched.
    pub kind: MatchKind,
    /// Similarity between message and phrase (computed only past the exact check).
    pub similarity: Option<f64>,
}

/// One-sided crisis detector.
///
/// A `true` result means a high-risk indicator was matched. A `false` result
/// proves nothing: detection is pattern-based and false negatives are
/// tolerated.
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    patterns: Cow<'static, [CrisisPattern]>,
    similarity_threshold: f64,
}

impl CrisisDetector {
    /// Creates a detector over the built-in phrase set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: Cow::Borrowed(DEFAULT_PATTERNS.as_slice()),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Sets the fuzzy-match threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the threshold is outside `[0.0, 1.0]`.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidInput(format!(
                "similarity threshold must be within [0, 1], got {threshold}"
            )));
        }
        self.similarity_threshold = threshold;
        Ok(self)
    }

    /// Adds phrases on top of the current set. Blank phrases are skipped.
    #[must_use]
    pub fn with_extra_patterns<S: AsRef<str>>(mut self, extra: &[S]) -> Self {
        let added: Vec<CrisisPattern> = extra
            .iter()
            .filter_map(|raw| CrisisPattern::new(raw.as_ref()))
            .filter(|p| !self.patterns.contains(p))
            .collect();
        if !added.is_empty() {
            self.patterns.to_mut().extend(added);
        }
        self
    }

    /// Returns the configured similarity threshold.
    #[must_use]
    pub const fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Returns the number of reference phrases.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the message contains a crisis indicator.
    #[must_use]
    pub fn detect(&self, text: &str) -> bool {
        let found = self.find_match(text);
        if let Some(ref m) = found {
            metrics::counter!("crisis_detections_total", "kind" => m.kind.as_str()).increment(1);
            tracing::warn!(
                match_kind = m.kind.as_str(),
                similarity = m.similarity,
                message_len = text.len(),
                "Crisis indicator matched"
            );
        }
        found.is_some()
    }

    /// Returns the first matching phrase and how it matched.
    ///
    /// Phrases are tried in order; for each phrase the exact, fuzzy and
    /// word-subset rules are tried in that order.
    #[must_use]
    pub fn find_match(&self, text: &str) -> Option<CrisisMatch<'_>> {
        let text = normalize_text(text);

        self.patterns.iter().find_map(|pattern| {
            let phrase = pattern.phrase();
            if text.contains(phrase) {
                return Some(CrisisMatch {
                    phrase,
                    kind: MatchKind::Exact,
                    similarity: None,
                });
            }

            let similarity = sequence_ratio(&text, phrase);
            if similarity >= self.similarity_threshold {
                return Some(CrisisMatch {
                    phrase,
                    kind: MatchKind::Fuzzy,
                    similarity: Some(similarity),
                });
            }

            // Word containment is substring-based and order-independent
            if pattern.words().iter().all(|w| text.contains(w.as_str())) {
                return Some(CrisisMatch {
                    phrase,
                    kind: MatchKind::WordSubset,
                    similarity: Some(similarity),
                });
            }

            None
        })
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new()
    }
}
