use super::lexicon::CompiledLexicon;
use crate::scoring::normalize::alpha_words;
use serde::Serialize;
use std::collections::HashSet;
use strum::Display;

pub const NEUTRAL_SCORE: f64 = 50.0;

pub const PREDICTABILITY_MIN_WORDS: usize = 10;
pub const PREDICTABILITY_SCALE: f64 = 300.0;
pub const TRIGRAM_WEIGHT: usize = 2;
pub const SUBSTANTIVE_WORD_MIN_LEN: usize = 3;

pub const BURSTINESS_MIN_SENTENCES: usize = 3;
pub const BURSTINESS_MIN_SENTENCE_WORDS: usize = 3;

pub const PHRASE_MATCH_POINTS: f64 = 25.0;
pub const PHRASE_EVIDENCE_LIMIT: usize = 3;

pub const STARTER_MIN_SENTENCES: usize = 4;
pub const STARTER_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    #[strum(serialize = "predictability")]
    Predictability,
    #[strum(serialize = "burstiness")]
    Burstiness,
    #[strum(serialize = "formality")]
    Formality,
    #[strum(serialize = "phrases")]
    Phrases,
    #[strum(serialize = "starters")]
    Starters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSignal {
    pub name: SignalKind,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl DetectionSignal {
    fn new(name: SignalKind, score: f64, explanation: Option<String>) -> Self {
        Self {
            name,
            score,
            explanation,
        }
    }
}

fn repetition_penalty(type_token_ratio: f64) -> f64 {
    if type_token_ratio < 0.4 {
        40.0
    } else if type_token_ratio < 0.5 {
        30.0
    } else if type_token_ratio < 0.6 {
        20.0
    } else if type_token_ratio < 0.7 {
        10.0
    } else {
        0.0
    }
}

/// Stand-in for low perplexity: how often filler n-grams appear, plus a
/// penalty for a narrow vocabulary.
pub fn predictability(text: &str, lexicon: &CompiledLexicon) -> DetectionSignal {
    let words = alpha_words(text);
    if words.len() < PREDICTABILITY_MIN_WORDS {
        return DetectionSignal::new(SignalKind::Predictability, NEUTRAL_SCORE, None);
    }

    let bigram_hits = words
        .windows(2)
        .filter(|w| lexicon.is_bigram(&w[0], &w[1]))
        .count();
    let trigram_hits = words
        .windows(3)
        .filter(|w| lexicon.is_trigram(&w[0], &w[1], &w[2]))
        .count();
    let predictable = bigram_hits + trigram_hits * TRIGRAM_WEIGHT;

    let substantive: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| w.len() > SUBSTANTIVE_WORD_MIN_LEN)
        .collect();
    let unique: HashSet<&str> = substantive.iter().copied().collect();
    let type_token_ratio = unique.len() as f64 / substantive.len().max(1) as f64;
    let penalty = repetition_penalty(type_token_ratio);

    let rate = predictable as f64 / (words.len() - 1).max(1) as f64;
    let score = (rate * PREDICTABILITY_SCALE + penalty).min(100.0);

    DetectionSignal::new(
        SignalKind::Predictability,
        score,
        Some(format!(
            "{predictable} filler n-gram hits, type-token ratio {type_token_ratio:.2}"
        )),
    )
}

fn uniformity_score(cv: f64) -> f64 {
    if cv < 0.15 {
        100.0
    } else if cv < 0.20 {
        85.0
    } else if cv < 0.25 {
        70.0
    } else if cv < 0.30 {
        55.0
    } else if cv < 0.35 {
        40.0
    } else if cv < 0.40 {
        25.0
    } else if cv < 0.50 {
        15.0
    } else {
        5.0
    }
}

/// High when sentence lengths barely vary.
pub fn burstiness(sentences: &[&str]) -> DetectionSignal {
    if sentences.len() < BURSTINESS_MIN_SENTENCES {
        return DetectionSignal::new(SignalKind::Burstiness, NEUTRAL_SCORE, None);
    }

    let lengths: Vec<f64> = sentences
        .iter()
        .map(|s| s.split_whitespace().count())
        .filter(|&n| n > BURSTINESS_MIN_SENTENCE_WORDS)
        .map(|n| n as f64)
        .collect();

    if lengths.len() < BURSTINESS_MIN_SENTENCES {
        return DetectionSignal::new(SignalKind::Burstiness, NEUTRAL_SCORE, None);
    }

    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<f64>() / n;
    let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean.max(1.0);

    DetectionSignal::new(
        SignalKind::Burstiness,
        uniformity_score(cv),
        Some(format!(
            "{} sentences, mean {mean:.1} words, cv {cv:.2}",
            lengths.len()
        )),
    )
}

fn formality_score(ratio: f64) -> f64 {
    if ratio > 0.12 {
        100.0
    } else if ratio > 0.08 {
        85.0
    } else if ratio > 0.06 {
        70.0
    } else if ratio > 0.04 {
        55.0
    } else if ratio > 0.03 {
        40.0
    } else if ratio > 0.02 {
        25.0
    } else if ratio > 0.01 {
        10.0
    } else {
        0.0
    }
}

pub fn formality(text: &str, word_count: usize, lexicon: &CompiledLexicon) -> DetectionSignal {
    let formal = lexicon.count_formal_words(text);
    let ratio = formal as f64 / word_count.max(1) as f64;

    DetectionSignal::new(
        SignalKind::Formality,
        formality_score(ratio),
        Some(format!("{formal} formal words ({:.1}%)", ratio * 100.0)),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatches {
    pub signal: DetectionSignal,
    pub count: usize,
    pub examples: Vec<String>,
}

pub fn phrase_matches(text: &str, lexicon: &CompiledLexicon) -> PhraseMatches {
    let text_lower = text.to_lowercase();
    let matched: Vec<&String> = lexicon
        .phrases()
        .iter()
        .filter(|phrase| text_lower.contains(phrase.as_str()))
        .collect();

    let count = matched.len();
    let examples: Vec<String> = matched
        .into_iter()
        .take(PHRASE_EVIDENCE_LIMIT)
        .cloned()
        .collect();
    let explanation = (!examples.is_empty()).then(|| format!("matched: {}", examples.join(", ")));

    PhraseMatches {
        signal: DetectionSignal::new(
            SignalKind::Phrases,
            (count as f64 * PHRASE_MATCH_POINTS).min(100.0),
            explanation,
        ),
        count,
        examples,
    }
}

fn starter_score(ratio: f64) -> f64 {
    if ratio < 0.4 {
        80.0
    } else if ratio < 0.5 {
        60.0
    } else if ratio < 0.6 {
        40.0
    } else if ratio < 0.7 {
        20.0
    } else {
        0.0
    }
}

/// High when many sentences open with the same two words.
pub fn sentence_starters(sentences: &[&str]) -> DetectionSignal {
    if sentences.len() < STARTER_MIN_SENTENCES {
        return DetectionSignal::new(SignalKind::Starters, 0.0, None);
    }

    let starters: Vec<String> = sentences
        .iter()
        .map(|s| {
            s.split_whitespace()
                .take(STARTER_WORDS)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .collect();
    let unique: HashSet<&str> = starters.iter().map(String::as_str).collect();
    let ratio = unique.len() as f64 / starters.len() as f64;

    DetectionSignal::new(
        SignalKind::Starters,
        starter_score(ratio),
        Some(format!(
            "{} distinct openers across {} sentences",
            unique.len(),
            starters.len()
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::detector::lexicon::Lexicon;
    use crate::scoring::normalize::split_sentences;

    fn lexicon() -> CompiledLexicon {
        Lexicon::builtin().compile().unwrap()
    }

    #[test]
    fn test_predictability_neutral_for_short_text() {
        let signal = predictability("only a handful of words here", &lexicon());
        assert_eq!(signal.score, NEUTRAL_SCORE);
        assert!(signal.explanation.is_none());
    }

    #[test]
    fn test_predictability_counts_ngrams() {
        let text = "It is cheap and zebras juggle quietly near old brick mills while \
                    ravens watch curious otters swim past muddy banks today";
        let signal = predictability(text, &lexicon());
        // one bigram hit over 20 gaps, no repetition penalty
        assert!((signal.score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_predictability_trigrams_weigh_double() {
        // "it is" x2, "as well", "as well as" -> 3 + 2 hits over 13 gaps
        let text = "It is cheap. It is fast, as well as portable; zebras juggle quietly today";
        let signal = predictability(text, &lexicon());
        assert_eq!(signal.score, 100.0);
        assert!(signal.explanation.unwrap().starts_with("5 filler"));
    }

    #[test]
    fn test_predictability_repetition_penalty() {
        let text = "blocks blocks blocks blocks blocks blocks blocks blocks blocks blocks";
        let signal = predictability(text, &lexicon());
        assert_eq!(signal.score, 40.0);
    }

    #[test]
    fn test_repetition_penalty_bands() {
        assert_eq!(repetition_penalty(0.39), 40.0);
        assert_eq!(repetition_penalty(0.4), 30.0);
        assert_eq!(repetition_penalty(0.55), 20.0);
        assert_eq!(repetition_penalty(0.65), 10.0);
        assert_eq!(repetition_penalty(0.7), 0.0);
    }

    #[test]
    fn test_burstiness_uniform_sentences() {
        let sentences = vec![
            "one two three four five six",
            "one two three four five six",
            "one two three four five six",
        ];
        assert_eq!(burstiness(&sentences).score, 100.0);
    }

    #[test]
    fn test_burstiness_varied_sentences() {
        let sentences = vec![
            "one two three four",
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen",
            "one two three four five six seven",
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty",
        ];
        assert_eq!(burstiness(&sentences).score, 5.0);
    }

    #[test]
    fn test_burstiness_neutral_when_few_long_sentences() {
        let sentences = vec!["tiny bit", "one two three four five", "one two"];
        assert_eq!(burstiness(&sentences).score, NEUTRAL_SCORE);
        assert_eq!(burstiness(&["a b c d e"]).score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_uniformity_band_edges() {
        assert_eq!(uniformity_score(0.149), 100.0);
        assert_eq!(uniformity_score(0.15), 85.0);
        assert_eq!(uniformity_score(0.20), 70.0);
        assert_eq!(uniformity_score(0.25), 55.0);
        assert_eq!(uniformity_score(0.30), 40.0);
        assert_eq!(uniformity_score(0.35), 25.0);
        assert_eq!(uniformity_score(0.40), 15.0);
        assert_eq!(uniformity_score(0.50), 5.0);
    }

    #[test]
    fn test_formality_bands() {
        assert_eq!(formality_score(0.01), 0.0);
        assert_eq!(formality_score(0.011), 10.0);
        assert_eq!(formality_score(0.021), 25.0);
        assert_eq!(formality_score(0.031), 40.0);
        assert_eq!(formality_score(0.041), 55.0);
        assert_eq!(formality_score(0.061), 70.0);
        assert_eq!(formality_score(0.081), 85.0);
        assert_eq!(formality_score(0.121), 100.0);
    }

    #[test]
    fn test_formality_ratio() {
        let text = "Furthermore the design is robust. Moreover it is scalable.";
        let signal = formality(text, 10, &lexicon());
        // 4 formal words in 10 -> ratio 0.4
        assert_eq!(signal.score, 100.0);

        let plain = formality("we shipped the thing on tuesday", 6, &lexicon());
        assert_eq!(plain.score, 0.0);
    }

    #[test]
    fn test_phrase_matches_evidence_capped() {
        let text = "In conclusion, it's worth noting that, in summary, this allows growth. Needless to say.";
        let result = phrase_matches(text, &lexicon());
        assert_eq!(result.count, 5);
        assert_eq!(result.signal.score, 100.0);
        assert_eq!(result.examples.len(), PHRASE_EVIDENCE_LIMIT);
        assert_eq!(result.examples[0], "it's worth noting");
    }

    #[test]
    fn test_phrase_matches_none() {
        let result = phrase_matches("we tried it and it broke", &lexicon());
        assert_eq!(result.count, 0);
        assert_eq!(result.signal.score, 0.0);
        assert!(result.signal.explanation.is_none());
    }

    #[test]
    fn test_sentence_starters_repetitive() {
        let text = "The chain stores blocks forever. The chain validates every block. \
                    The chain is shared by all. The chain never forgets anything.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 4);
        // one distinct starter over four sentences
        assert_eq!(sentence_starters(&sentences).score, 80.0);
    }

    #[test]
    fn test_sentence_starters_needs_four_sentences() {
        let sentences = vec!["The chain stores", "The chain keeps", "The chain holds"];
        assert_eq!(sentence_starters(&sentences).score, 0.0);
    }

    #[test]
    fn test_starter_bands() {
        assert_eq!(starter_score(0.39), 80.0);
        assert_eq!(starter_score(0.45), 60.0);
        assert_eq!(starter_score(0.5), 40.0);
        assert_eq!(starter_score(0.6), 20.0);
        assert_eq!(starter_score(0.7), 0.0);
    }
}
