//! Static emotion mapping data.
//!
//! Keyword cues and the extended-emotion combination table. Both are
//! immutable and shared by reference.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::BaseEmotion::{Anger, Disgust, Fear, Joy, Sadness, Surprise};
use crate::models::{BaseEmotion, CRISIS_LABEL, ExtendedEmotion};
use regex::Regex;
use std::sync::LazyLock;

/// Positive sentiment cue words.
pub const POSITIVE_CUES: &[&str] = &["bien", "feliz", "genial", "contento", "alegre", "maravilloso"];

/// Negative sentiment cue words.
pub const NEGATIVE_CUES: &[&str] = &["mal", "triste", "desesperado", "harto", "deprimido"];

/// Case-insensitive alternation matching any cue anywhere in the text.
///
/// Cues match inside longer words: `bien` fires on `también`, `mal` on
/// `malestar`.
fn cue_regex(words: &[&str]) -> String {
    let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    format!("(?i)(?:{})", alternation.join("|"))
}

/// Substring matcher for [`POSITIVE_CUES`].
pub static POSITIVE_CUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&cue_regex(POSITIVE_CUES)).expect("static regex: positive cues")
});

/// Substring matcher for [`NEGATIVE_CUES`].
pub static NEGATIVE_CUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&cue_regex(NEGATIVE_CUES)).expect("static regex: negative cues")
});

/// An extended emotion and the base emotions it is composed of.
#[derive(Debug)]
pub struct ExtendedCombination {
    /// Extended label.
    pub label: &'static str,
    /// One or two base emotions.
    pub bases: &'static [BaseEmotion],
    /// Reachable only through crisis detection, never by score combination.
    pub detector_only: bool,
}

impl ExtendedCombination {
    const fn new(label: &'static str, bases: &'static [BaseEmotion]) -> Self {
        Self {
            label,
            bases,
            detector_only: false,
        }
    }

    /// Returns true if `{a, b}` equals this combination as a set.
    #[must_use]
    pub fn matches_pair(&self, a: BaseEmotion, b: BaseEmotion) -> bool {
        if a == b {
            return self.bases.len() == 1 && self.bases[0] == a;
        }
        self.bases.len() == 2 && self.bases.contains(&a) && self.bases.contains(&b)
    }

    /// Returns the label as an extended emotion.
    #[must_use]
    pub const fn emotion(&self) -> ExtendedEmotion {
        ExtendedEmotion::from_static(self.label)
    }
}

/// Extended vocabulary of the guidance store, in lookup priority order.
pub static EXTENDED_COMBINATIONS: &[ExtendedCombination] = &[
    ExtendedCombination::new("ansiedad", &[Fear]),
    ExtendedCombination::new("ira", &[Anger, Disgust]),
    ExtendedCombination::new("culpa", &[Sadness, Fear]),
    ExtendedCombination::new("soledad", &[Sadness]),
    ExtendedCombination::new("frustracion", &[Anger, Sadness]),
    ExtendedCombination::new("confusion", &[Fear, Surprise]),
    ExtendedCombination::new("agotamiento", &[Sadness, Disgust]),
    ExtendedCombination::new("desesperanza", &[Sadness, Fear]),
    ExtendedCombination::new("verguenza", &[Fear, Sadness]),
    ExtendedCombination::new("euforia", &[Joy]),
    ExtendedCombination::new("apatia", &[Sadness, Disgust]),
    ExtendedCombination::new("duelo", &[Sadness]),
    ExtendedCombination::new("autoagresion", &[Sadness, Anger]),
    ExtendedCombination::new("depresion leve", &[Sadness]),
    ExtendedCombination {
        label: CRISIS_LABEL,
        bases: &[Sadness, Fear],
        detector_only: true,
    },
    ExtendedCombination::new("pensamientos negativos", &[Sadness, Anger]),
    ExtendedCombination::new("tolerancia al distress", &[Fear, Sadness]),
    ExtendedCombination::new("mindfulness", &[Joy, Surprise]),
];

/// Finds the first combination matching the unordered pair `{a, b}`.
///
/// Detector-only labels are skipped.
#[must_use]
pub fn combination_for(a: BaseEmotion, b: BaseEmotion) -> Option<&'static ExtendedCombination> {
    EXTENDED_COMBINATIONS
        .iter()
        .filter(|c| !c.detector_only)
        .find(|c| c.matches_pair(a, b))
}
