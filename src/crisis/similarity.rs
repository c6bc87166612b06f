//! Character-level sequence similarity.
//!
//! Gestalt (Ratcliff/Obershelp) pattern matching: repeatedly take the longest
//! common contiguous block, then recurse on the unmatched pieces left and
//! right of it. The ratio is `2 * M / T`, where `M` is the total size of the
//! matching blocks and `T` the combined length of both sequences.
//!
//! No junk heuristic is applied; reference phrases are short, so the
//! popular-element pruning used for long sequences never matters here.

use std::collections::HashMap;

/// Finds the longest matching block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Among equally long blocks, the one starting
/// earliest in `a` wins, then earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // j2len[j] = length of the match ending at a[i - 1] and b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next;
    }

    (best_i, best_j, best_size)
}

/// Returns the total number of characters in all matching blocks.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push(((alo, i), (blo, j)));
        }
        if i + k < ahi && j + k < bhi {
            pending.push(((i + k, ahi), (j + k, bhi)));
        }
    }
    total
}

/// Returns the similarity ratio of two strings in `[0.0, 1.0]`.
///
/// Two empty strings are identical (`1.0`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let length = a.len() + b.len();
    if length == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / length as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical() {
        assert!(approx(sequence_ratio("me quiero morir", "me quiero morir"), 1.0));
    }

    #[test]
    fn test_both_empty() {
        assert!(approx(sequence_ratio("", ""), 1.0));
    }

    #[test]
    fn test_one_empty() {
        assert!(approx(sequence_ratio("", "matarme"), 0.0));
    }

    #[test]
    fn test_transposed_typo() {
        // 14 of 15 characters line up: 2 * 14 / 30
        let ratio = sequence_ratio("me quiero morri", "me quiero morir");
        assert!(approx(ratio, 28.0 / 30.0), "got {ratio}");
    }

    #[test]
    fn test_rotation() {
        // "bcd" is the only block: 2 * 3 / 8
        assert!(approx(sequence_ratio("abcd", "bcda"), 0.75));
    }

    #[test]
    fn test_recursion_on_both_sides() {
        // blocks "ab" and "cd": 2 * 4 / 9
        assert!(approx(sequence_ratio("abxcd", "abcd"), 8.0 / 9.0));
    }

    #[test]
    fn test_dropped_letter() {
        // 2 * 6 / 13
        assert!(approx(sequence_ratio("matarme", "matame"), 12.0 / 13.0));
    }

    #[test]
    fn test_unrelated() {
        assert!(sequence_ratio("hola", "morirme") < 0.3);
    }

    #[test]
    fn test_multibyte_characters() {
        // 2 * 19 / 40
        let ratio = sequence_ratio("no quiero estar aqui", "no quiero estar aquí");
        assert!(approx(ratio, 0.95), "got {ratio}");
    }
}
