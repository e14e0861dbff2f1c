//! Approximate substring matching with a normalized error threshold.
//!
//! A pattern matches a text when some substring of the text is within
//! `threshold * pattern_len` edits (insertions, deletions, substitutions) of
//! the pattern. Matching is case-insensitive and location-independent.
//! Patterns longer than [`MAX_PATTERN_CHARS`] are split into chunks that
//! must each match; their scores are averaged.

/// Longest pattern chunk matched in one pass.
pub const MAX_PATTERN_CHARS: usize = 32;
/// Default similarity threshold (0 = exact, 1 = anything).
pub const DEFAULT_THRESHOLD: f64 = 0.4;
/// Best score assigned to a partial exact match; only a whole-text match
/// scores a perfect 0.
pub const MIN_PARTIAL_SCORE: f64 = 0.001;

/// A pre-lowercased search pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    chunks: Vec<Vec<char>>,
    full: Vec<char>,
}

impl Pattern {
    /// Build a pattern from user input. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let full: Vec<char> = raw.trim().to_lowercase().chars().collect();
        if full.is_empty() {
            return None;
        }
        let chunks = full
            .chunks(MAX_PATTERN_CHARS)
            .map(|chunk| chunk.to_vec())
            .collect();
        Some(Self { chunks, full })
    }

    /// Score this pattern against an already-lowercased text.
    ///
    /// # Returns
    /// `Some(score)` in `[0, threshold]` when the text matches, else `None`.
    pub fn score(&self, text: &[char], threshold: f64) -> Option<f64> {
        if text == self.full.as_slice() {
            return Some(0.0);
        }
        let mut total = 0.0;
        for chunk in &self.chunks {
            let allowed = (threshold * chunk.len() as f64).floor() as usize;
            let errors = min_substring_distance(chunk, text, allowed)?;
            let score = errors as f64 / chunk.len() as f64;
            if score > threshold {
                return None;
            }
            total += score.max(MIN_PARTIAL_SCORE);
        }
        Some(total / self.chunks.len() as f64)
    }
}

/// Minimum edit distance between `pattern` and any substring of `text`,
/// or `None` when it exceeds `max_errors`.
///
/// Semi-global dynamic programming: starting anywhere in the text is free,
/// so the first row is all zeros. Runs in `O(pattern * text)` time with a
/// single column of state.
pub fn min_substring_distance(pattern: &[char], text: &[char], max_errors: usize) -> Option<usize> {
    let m = pattern.len();
    if m == 0 {
        return Some(0);
    }
    // column[i] = best distance of pattern[..i] ending at the current text position.
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = column[m];

    for &t in text {
        let mut diagonal = column[0];
        column[0] = 0;
        for i in 1..=m {
            let substitution = diagonal + usize::from(pattern[i - 1] != t);
            let deletion = column[i] + 1;
            let insertion = column[i - 1] + 1;
            diagonal = column[i];
            column[i] = substitution.min(deletion).min(insertion);
        }
        best = best.min(column[m]);
        if best == 0 {
            break;
        }
    }

    (best <= max_errors).then_some(best)
}

/// Lowercased text prepared for matching, with its field-length norm.
#[derive(Debug, Clone, Default)]
pub struct IndexedText {
    pub chars: Vec<char>,
    pub norm: f64,
}

impl IndexedText {
    /// Lowercase `text` and compute its norm (`1 / sqrt(word count)`,
    /// rounded to three decimals) so matches in short fields weigh more.
    pub fn new(text: &str) -> Self {
        let words = text.split_whitespace().count().max(1);
        let norm = (1.0 / (words as f64).sqrt() * 1000.0).round() / 1000.0;
        Self {
            chars: text.to_lowercase().chars().collect(),
            norm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn exact_substring_has_zero_errors() {
        assert_eq!(min_substring_distance(&chars("fetch"), &chars("async fetch data"), 0), Some(0));
    }

    #[test]
    fn typos_count_as_edits() {
        assert_eq!(min_substring_distance(&chars("fetch"), &chars("a fecth b"), 2), Some(2));
        assert_eq!(min_substring_distance(&chars("fetch"), &chars("a fetc b"), 2), Some(1));
        assert_eq!(min_substring_distance(&chars("fetch"), &chars("xyz"), 2), None);
    }

    #[test]
    fn pattern_scores_respect_threshold() {
        let pattern = Pattern::new("Fetch").unwrap();
        let text = IndexedText::new("Fetch helper");
        assert_eq!(pattern.score(&text.chars, DEFAULT_THRESHOLD), Some(MIN_PARTIAL_SCORE));

        let typo = IndexedText::new("fecth");
        let score = pattern.score(&typo.chars, DEFAULT_THRESHOLD).unwrap();
        assert!((score - 0.4).abs() < 1e-9);
        assert_eq!(pattern.score(&typo.chars, 0.2), None);

        let whole = IndexedText::new("fetch");
        assert_eq!(pattern.score(&whole.chars, DEFAULT_THRESHOLD), Some(0.0));
    }

    #[test]
    fn blank_patterns_are_rejected() {
        assert!(Pattern::new("   ").is_none());
    }

    #[test]
    fn long_patterns_are_chunked() {
        let raw = "a".repeat(40);
        let pattern = Pattern::new(&raw).unwrap();
        assert_eq!(pattern.chunks.len(), 2);
        let text = IndexedText::new(&format!("xx{}yy", raw));
        assert!(pattern.score(&text.chars, DEFAULT_THRESHOLD).is_some());
    }

    #[test]
    fn norm_shrinks_with_word_count() {
        assert_eq!(IndexedText::new("one").norm, 1.0);
        assert_eq!(IndexedText::new("one two three four").norm, 0.5);
        assert_eq!(IndexedText::new("").norm, 1.0);
    }
}
