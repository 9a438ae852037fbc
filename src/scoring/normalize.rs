use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}',
];

pub const MIN_SENTENCE_CHARS: usize = 10;

static SENTENCE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Lowercased, punctuation-stripped, whitespace-collapsed view of a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &NormalizedText) -> bool {
        !needle.is_empty() && self.0.contains(needle.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(text: &str) -> NormalizedText {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if STRIPPED_PUNCTUATION.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();

    NormalizedText(replaced.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercase ASCII-letter projection of every whitespace token. Tokens with no
/// letters stay in the list as empty strings so positions line up with the
/// raw token stream.
pub fn alpha_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_lowercase())
                .collect()
        })
        .collect()
}

pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT
        .split(text)
        .filter(|s| s.trim().chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}
