use super::normalize::{normalize, word_count};
use super::rubric::SkillRubric;
use serde::Serialize;

pub const MAX_KEYPHRASE_SCORE: u32 = 90;

pub const SHORT_ANSWER_WORDS: usize = 30;
pub const SHORT_ANSWER_PENALTY: u32 = 10;

const COHERENCE_BANDS: &[(usize, u32)] = &[(100, 10), (75, 8), (50, 5), (30, 3)];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyphraseBreakdown {
    #[serde(rename = "keyphrases")]
    pub keyphrase_score: u32,
    #[serde(rename = "coherence")]
    pub coherence_score: u32,
    pub penalty: u32,
    pub matched: Vec<String>,
    pub missed: Vec<String>,
    pub word_count: usize,
}

impl KeyphraseBreakdown {
    pub fn raw_score(&self) -> i64 {
        self.keyphrase_score as i64 + self.coherence_score as i64 - self.penalty as i64
    }
}

pub fn coherence_bonus(words: usize) -> u32 {
    COHERENCE_BANDS
        .iter()
        .find(|(min_words, _)| words >= *min_words)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

pub fn short_answer_penalty(words: usize) -> u32 {
    if words < SHORT_ANSWER_WORDS {
        SHORT_ANSWER_PENALTY
    } else {
        0
    }
}

/// Concept coverage of `answer` against the rubric's weighted keyphrases.
pub fn score_answer(rubric: &SkillRubric, answer: &str) -> KeyphraseBreakdown {
    let words = word_count(answer);
    let normalized = normalize(answer);

    let mut total: u32 = 0;
    let mut matched = Vec::new();
    let mut missed = Vec::new();

    for keyphrase in &rubric.keyphrases {
        let hit = keyphrase
            .variants()
            .any(|variant| normalized.contains(&normalize(variant)));

        if hit {
            total = total.saturating_add(keyphrase.weight);
            matched.push(keyphrase.text.clone());
        } else {
            missed.push(keyphrase.text.clone());
        }
    }

    KeyphraseBreakdown {
        keyphrase_score: total.min(MAX_KEYPHRASE_SCORE),
        coherence_score: coherence_bonus(words),
        penalty: short_answer_penalty(words),
        matched,
        missed,
        word_count: words,
    }
}
