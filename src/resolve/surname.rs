//! Surname extraction heuristics

/// Strip punctuation and surrounding whitespace from a raw name
///
/// "A. Wilkie" and "Wilkie, A" both reduce to a plain two-token form.
pub fn whole_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Strategy for extracting the grouping key from a normalized name
///
/// Kept behind a trait so a culture-aware extractor can replace the default
/// heuristic without touching the grouping or disambiguation logic.
pub trait SurnameRule {
    fn key(&self, whole: &str) -> String;
}

/// Default heuristic: the longest whitespace-delimited token
///
/// Usually, but not reliably, the surname. Ties go to the earliest token.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestToken;

impl SurnameRule for LongestToken {
    fn key(&self, whole: &str) -> String {
        whole
            .split_whitespace()
            .fold("", |best, token| {
                if token.len() > best.len() {
                    token
                } else {
                    best
                }
            })
            .to_string()
    }
}
