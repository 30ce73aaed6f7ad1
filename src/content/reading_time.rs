//! Reading-time estimation

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Estimated reading duration for a body of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: f64,
    /// Human-readable form, e.g. "5 min read"
    pub text: String,
}

impl ReadingTime {
    pub fn estimate(body: &str, words_per_minute: usize) -> Self {
        let words = count_words(body);
        let wpm = words_per_minute.max(1) as f64;
        let minutes = words as f64 / wpm;
        // Round to two decimals before the ceiling: 2.01 reads as 3, 2.001 as 2
        let displayed = ((minutes * 100.0).round() / 100.0).ceil() as u64;

        Self {
            words,
            minutes,
            text: format!("{} min read", displayed),
        }
    }
}

/// Count words; each CJK character counts as a word of its own
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            count += 1;
            in_word = true;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // Hiragana, Katakana
        | 0x3400..=0x4DBF   // CJK Extension A
        | 0x4E00..=0x9FFF   // CJK Unified Ideographs
        | 0xAC00..=0xD7AF   // Hangul syllables
        | 0xF900..=0xFAFF)  // CJK Compatibility Ideographs
}
