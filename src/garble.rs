//! Detection and cleanup of text that was decoded with the wrong charset or
//! is really binary data.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Share of replacement/NUL characters above which text counts as garbled.
///
/// The same ratio is used for the fetcher's per-attempt check and the
/// post-fetch detector, so an attempt the fetcher accepts is never one the
/// detector would reject.
pub const GARBLE_THRESHOLD: f64 = 0.05;

/// Texts at or below this many characters skip the per-attempt check.
pub const SAMPLE_MIN_LENGTH: usize = 1000;

/// Lines whose readable share is not above this ratio are dropped by [`scrub`].
const MIN_READABLE_RATIO: f64 = 0.4;

const COMMON_PUNCTUATION: &str = ".,!?;:'\"()-";

static CONTROL_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x09\x0B-\x1F\x7F-\x9F]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GarbleAssessment {
    pub garbled_char_count: usize,
    pub total_length: usize,
    pub is_garbled: bool,
}

impl GarbleAssessment {
    pub fn of(text: &str) -> Self {
        let mut garbled_char_count = 0;
        let mut total_length = 0;
        for c in text.chars() {
            total_length += 1;
            if is_garble_char(c) {
                garbled_char_count += 1;
            }
        }

        let is_garbled = total_length > 0
            && garbled_char_count as f64 / total_length as f64 > GARBLE_THRESHOLD;

        Self {
            garbled_char_count,
            total_length,
            is_garbled,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total_length == 0 {
            0.0
        } else {
            self.garbled_char_count as f64 / self.total_length as f64
        }
    }

    /// Same counts with the flag lowered, used once a cleaner substitute
    /// has been accepted.
    pub fn cleared(self) -> Self {
        Self {
            is_garbled: false,
            ..self
        }
    }
}

pub fn is_garble_char(c: char) -> bool {
    c == '\u{FFFD}' || c == '\0'
}

/// Whether a fetch attempt's decoded text is good enough to stop retrying.
pub fn passes_sample_check(text: &str) -> bool {
    text.chars().count() <= SAMPLE_MIN_LENGTH || !GarbleAssessment::of(text).is_garbled
}

/// Strip decoding debris from finished digest text.
///
/// Removes NUL and replacement characters, collapses runs of other control
/// characters (newline excepted) to one space, and drops non-blank lines
/// that are mostly symbols. The first line carries the site title and is
/// always kept.
pub fn scrub(text: &str) -> String {
    let text: String = text.chars().filter(|c| !is_garble_char(*c)).collect();
    let text = CONTROL_RUNS.replace_all(&text, " ");

    text.split('\n')
        .enumerate()
        .filter(|(index, line)| *index == 0 || line.trim().is_empty() || is_readable(line))
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_readable(line: &str) -> bool {
    let mut readable = 0usize;
    let mut total = 0usize;
    for c in line.chars() {
        total += 1;
        if c.is_alphanumeric() || c.is_whitespace() || COMMON_PUNCTUATION.contains(c) {
            readable += 1;
        }
    }
    total == 0 || readable as f64 / total as f64 > MIN_READABLE_RATIO
}
