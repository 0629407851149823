//! Query-time ranking.
//!
//! Scores are taken in corpus order, narrowed to a fixed candidate window,
//! sorted best-first and then truncated to the caller's `top_k`. Equal
//! scores are ordered by ascending corpus position, so a given index and
//! query always produce the same output.

use std::cmp::Ordering;

use advisor_types::{Recommendation, UNKNOWN_LEVEL};
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use crate::corpus::Corpus;

/// Results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 30;

/// Candidate window: how many top-scoring courses survive the first cut.
pub const CANDIDATES_K: usize = 50;

/// A scored corpus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f32,
}

/// Higher score first, then lower corpus index.
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Map non-finite scores and `-0.0` to `0.0`; clamp into [-1, 1].
fn sanitize(score: f32) -> f32 {
    if !score.is_finite() || score == 0.0 {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    }
}

/// The `window` best candidates, sorted best-first.
pub fn select_candidates(scores: &[f32], window: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| Candidate {
            index,
            score: sanitize(score),
        })
        .collect();

    let window = window.min(candidates.len());
    if window == 0 {
        return Vec::new();
    }
    if window < candidates.len() {
        candidates.select_nth_unstable_by(window - 1, rank_order);
        candidates.truncate(window);
    }
    candidates.sort_by(rank_order);
    candidates
}

fn is_decimal_digit(c: char) -> bool {
    c.general_category() == GeneralCategory::DecimalNumber
}

/// Value of a Unicode decimal digit (`Nd`), e.g. `'3'`, `'\u{0663}'`, `'\u{FF12}'`.
///
/// `Nd` digits are encoded in contiguous runs of ten starting at zero, so
/// the value is the distance from the start of the run, modulo 10.
fn decimal_value(c: char) -> Option<u8> {
    if let Some(d) = c.to_digit(10) {
        return Some(d as u8);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut offset = 0u32;
    let mut cp = c as u32;
    while let Some(prev) = cp.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        cp -= 1;
    }
    Some((offset % 10) as u8)
}

/// Level hint: the first decimal digit anywhere in `code`, or `UNKNOWN_LEVEL`.
pub fn derive_level(code: &str) -> u8 {
    code.chars()
        .find_map(decimal_value)
        .unwrap_or(UNKNOWN_LEVEL)
}

/// Round to 2 decimal places, exact halves to even (`0.125` -> `0.12`).
pub fn round_score(score: f32) -> f64 {
    (score as f64 * 100.0).round_ties_even() / 100.0
}

/// Turn per-course scores into at most `min(top_k, candidates_k, N)`
/// recommendations.
///
/// `scores[i]` must belong to `corpus.get(i)`.
pub fn rank(
    corpus: &Corpus,
    scores: &[f32],
    top_k: usize,
    candidates_k: usize,
) -> Vec<Recommendation> {
    debug_assert_eq!(scores.len(), corpus.len());

    select_candidates(scores, candidates_k)
        .into_iter()
        .filter_map(|candidate| {
            corpus.get(candidate.index).map(|course| Recommendation {
                level: derive_level(&course.code),
                match_score: round_score(candidate.score),
                course: course.clone(),
            })
        })
        .take(top_k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_types::Course;

    #[test]
    fn test_derive_level() {
        assert_eq!(derive_level("CS101"), 1);
        assert_eq!(derive_level("EEMBA"), 99);
        assert_eq!(derive_level("3DX"), 3);
        assert_eq!(derive_level("IM4021"), 4);
        assert_eq!(derive_level(""), UNKNOWN_LEVEL);
        assert_eq!(derive_level("CS0XX"), 0);
    }

    #[test]
    fn test_derive_level_non_ascii_digits() {
        // Arabic-Indic three comes before the ASCII digits
        assert_eq!(derive_level("CS\u{0663}01"), 3);
        // Fullwidth two
        assert_eq!(derive_level("EE\u{FF12}XX"), 2);
        // Devanagari nine
        assert_eq!(derive_level("HI\u{096F}"), 9);
        // Mathematical bold digits run 50 long; U+1D7D7 is bold nine
        assert_eq!(derive_level("M\u{1D7D7}"), 9);
        // Numeric but not decimal: superscript two, Roman numeral four
        assert_eq!(derive_level("X\u{00B2}\u{2163}"), UNKNOWN_LEVEL);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.5678), 0.57);
        assert_eq!(round_score(-0.123), -0.12);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_round_score_halves_to_even() {
        assert_eq!(round_score(0.125), 0.12);
        assert_eq!(round_score(0.625), 0.62);
        assert_eq!(round_score(-0.125), -0.12);
        assert_eq!(round_score(0.375), 0.38);
    }

    #[test]
    fn test_select_window_sorted_desc() {
        let scores = [0.1, 0.9, 0.5, 0.7, 0.3];
        let picked = select_candidates(&scores, 3);
        let idx: Vec<usize> = picked.iter().map(|c| c.index).collect();
        assert_eq!(idx, vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let scores = [0.5, 0.8, 0.5, 0.8, 0.5];
        let picked = select_candidates(&scores, 4);
        let idx: Vec<usize> = picked.iter().map(|c| c.index).collect();
        assert_eq!(idx, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_window_larger_than_input() {
        let picked = select_candidates(&[0.2, 0.4], 50);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].index, 1);
        assert!(select_candidates(&[], 50).is_empty());
        assert!(select_candidates(&[0.3], 0).is_empty());
    }

    #[test]
    fn test_nan_and_negative_zero_sanitized() {
        let scores = [f32::NAN, -0.0, 0.4, f32::INFINITY, 1.2];
        let picked = select_candidates(&scores, 5);
        let idx: Vec<usize> = picked.iter().map(|c| c.index).collect();
        // 1.2 clamps to 1.0; NaN, -0.0 and inf all become 0.0 and tie.
        assert_eq!(idx, vec![4, 2, 0, 1, 3]);
        assert_eq!(picked[0].score, 1.0);
    }

    #[test]
    fn test_rank_truncates_and_decorates() {
        let corpus = Corpus::from_courses([
            Course::new("CS101", "Intro to AI", ""),
            Course::new("ART200", "Oil Painting", ""),
            Course::new("EEMBA", "Executive MBA", ""),
        ]);
        let scores = [0.634, -0.021, 0.2];

        let results = rank(&corpus, &scores, 2, CANDIDATES_K);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code(), "CS101");
        assert_eq!(results[0].level, 1);
        assert_eq!(results[0].match_score, 0.63);
        assert_eq!(results[1].code(), "EEMBA");
        assert_eq!(results[1].level, 99);
        assert_eq!(results[1].match_score, 0.2);
    }

    #[test]
    fn test_result_size_law() {
        let courses: Vec<Course> = (0..70)
            .map(|i| Course::new(format!("C{}", i), format!("Course {}", i), ""))
            .collect();
        let corpus = Corpus::from_courses(courses);
        let scores: Vec<f32> = (0..70).map(|i| (i as f32) / 100.0).collect();

        for top_k in [1, 30, 50, 60, 100] {
            let results = rank(&corpus, &scores, top_k, CANDIDATES_K);
            assert_eq!(results.len(), top_k.min(CANDIDATES_K).min(70));
        }
    }
}
