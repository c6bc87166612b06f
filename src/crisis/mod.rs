//! Crisis detection.
//!
//! Scans raw message text against a curated set of high-risk phrases using
//! three rules per phrase:
//!
//! 1. **Exact**: the normalized phrase is a substring of the normalized text
//! 2. **Fuzzy**: character-level sequence similarity reaches the threshold
//! 3. **Word subset**: every word of the phrase appears somewhere in the text
//!
//! Detection runs inline in `O(patterns × text)` time.

mod detector;
mod patterns;
mod similarity;

pub use detector::{CrisisDetector, CrisisMatch, DEFAULT_SIMILARITY_THRESHOLD, MatchKind};
pub use patterns::{CRITICAL_PATTERNS, CrisisPattern, DEFAULT_PATTERNS, normalize_text};
pub use similarity::sequence_ratio;
