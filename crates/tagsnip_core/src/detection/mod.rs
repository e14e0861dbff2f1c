//! Heuristic language detection over per-language regex signatures.
//!
//! Each language scores one point per distinct signature that matches
//! anywhere in the text. The strictly highest score wins, ties go to the
//! language declared first, and a winner needs at least
//! [`MIN_CONFIDENT_SCORE`] points.

/// Language catalogue (ids, display names, extensions).
pub mod languages;
mod patterns;

/// Inputs shorter than this (after trimming) are never classified.
pub const MIN_DETECT_CHARS: usize = 10;
/// Minimum score for a confident guess.
pub const MIN_CONFIDENT_SCORE: usize = 2;
/// Below this many characters, editor text is too short to re-detect on.
pub const REDETECT_FLOOR_CHARS: usize = 20;
/// Length change that makes re-detection worthwhile.
pub const REDETECT_DELTA_CHARS: usize = 50;

/// Score every language against `code`, in declaration order.
///
/// # Returns
/// `(language id, number of matching signatures)` for each language.
pub fn scores(code: &str) -> Vec<(&'static str, usize)> {
    patterns::compiled()
        .iter()
        .map(|language| {
            let score = language
                .signatures
                .iter()
                .filter(|signature| signature.is_match(code))
                .count();
            (language.id, score)
        })
        .collect()
}

/// Guess the language of `code`.
///
/// # Returns
/// The best-scoring language id, or `None` when the text is too short or no
/// language reaches [`MIN_CONFIDENT_SCORE`].
pub fn detect(code: &str) -> Option<&'static str> {
    if code.trim().chars().count() < MIN_DETECT_CHARS {
        return None;
    }

    let mut best: Option<&'static str> = None;
    let mut highest = 0usize;
    for (id, score) in scores(code) {
        if score > highest {
            highest = score;
            best = Some(id);
        }
    }

    if highest >= MIN_CONFIDENT_SCORE {
        best
    } else {
        None
    }
}

/// Editor-side throttle that decides when re-running [`detect`] is worth it.
///
/// Detection runs only once the buffer is longer than
/// [`REDETECT_FLOOR_CHARS`], and then only if its length moved by more than
/// [`REDETECT_DELTA_CHARS`] since the last accepted detection or the last
/// accepted text was itself below the floor.
#[derive(Debug, Clone)]
pub struct LanguageTracker {
    enabled: bool,
    last_len: usize,
}

impl LanguageTracker {
    /// Start tracking a session whose buffer currently holds `initial`.
    pub fn new(initial: &str, enabled: bool) -> Self {
        Self {
            enabled,
            last_len: initial.chars().count(),
        }
    }

    /// Reset for a new editing session.
    pub fn reset(&mut self, initial: &str) {
        self.last_len = initial.chars().count();
    }

    /// Whether auto-detection is on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Turn auto-detection on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Observe an edit.
    ///
    /// # Arguments
    /// - `code`: The full buffer after the edit.
    /// - `current_language`: Language the snippet is tagged with now.
    ///
    /// # Returns
    /// `Some(new_language)` when detection ran and found a different
    /// language; the tracker then remembers `code` as the new baseline.
    pub fn on_change(&mut self, code: &str, current_language: &str) -> Option<&'static str> {
        if !self.enabled {
            return None;
        }
        let len = code.chars().count();
        if len <= REDETECT_FLOOR_CHARS {
            return None;
        }
        if len.abs_diff(self.last_len) <= REDETECT_DELTA_CHARS && self.last_len >= REDETECT_FLOOR_CHARS {
            return None;
        }
        let detected = detect(code)?;
        if detected == current_language {
            return None;
        }
        self.last_len = len;
        Some(detected)
    }
}
