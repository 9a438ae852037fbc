pub mod lexicon;
pub mod signals;

pub use lexicon::{CompiledLexicon, Lexicon, LexiconError};
pub use signals::{DetectionSignal, SignalKind};

use crate::scoring::normalize::{split_sentences, word_count};
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use strum::Display;

pub const MIN_TEXT_CHARS: usize = 50;
pub const MIN_TEXT_WORDS: usize = 20;
pub const MAX_FLAGS: usize = 5;

pub const WEIGHT_PREDICTABILITY: f64 = 0.30;
pub const WEIGHT_BURSTINESS: f64 = 0.30;
pub const WEIGHT_FORMALITY: f64 = 0.15;
pub const WEIGHT_PHRASES: f64 = 0.15;
pub const WEIGHT_STARTERS: f64 = 0.10;

pub const FLAGGED_THRESHOLD: u8 = 25;

pub const NOTABLE_PREDICTABILITY: f64 = 40.0;
pub const NOTABLE_BURSTINESS: f64 = 50.0;
pub const NOTABLE_FORMALITY: f64 = 40.0;
pub const NOTABLE_STARTERS: f64 = 40.0;

static BUILTIN_LEXICON: LazyLock<Arc<CompiledLexicon>> = LazyLock::new(|| {
    Arc::new(
        Lexicon::builtin()
            .compile()
            .expect("builtin lexicon is valid"),
    )
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    #[strum(serialize = "human")]
    Human,
    #[strum(serialize = "mixed")]
    Mixed,
    #[strum(serialize = "likely_ai")]
    LikelyAi,
    #[strum(serialize = "ai_generated")]
    AiGenerated,
}

impl Verdict {
    pub const AI_GENERATED_THRESHOLD: u8 = 45;
    pub const LIKELY_AI_THRESHOLD: u8 = 30;
    pub const MIXED_THRESHOLD: u8 = 20;

    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= Self::AI_GENERATED_THRESHOLD {
            Verdict::AiGenerated
        } else if confidence >= Self::LIKELY_AI_THRESHOLD {
            Verdict::LikelyAi
        } else if confidence >= Self::MIXED_THRESHOLD {
            Verdict::Mixed
        } else {
            Verdict::Human
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiDetection {
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub confidence: u8,
    pub verdict: Verdict,
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<DetectionSignal>,
}

impl AiDetection {
    pub fn human(flags: Vec<String>) -> Self {
        Self {
            is_ai: false,
            confidence: 0,
            verdict: Verdict::Human,
            flags,
            signals: Vec::new(),
        }
    }

    pub fn signal(&self, kind: SignalKind) -> Option<&DetectionSignal> {
        self.signals.iter().find(|s| s.name == kind)
    }
}

pub fn is_flagged(confidence: u8) -> bool {
    confidence >= FLAGGED_THRESHOLD
}

/// Raw 0-100 scores of the five signals, before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalScores {
    pub predictability: f64,
    pub burstiness: f64,
    pub formality: f64,
    pub phrases: f64,
    pub phrase_count: usize,
    pub starters: f64,
}

impl SignalScores {
    pub fn combined(&self) -> f64 {
        self.predictability * WEIGHT_PREDICTABILITY
            + self.burstiness * WEIGHT_BURSTINESS
            + self.formality * WEIGHT_FORMALITY
            + self.phrases * WEIGHT_PHRASES
            + self.starters * WEIGHT_STARTERS
    }

    pub fn confidence(&self) -> u8 {
        self.combined().round().clamp(0.0, 100.0) as u8
    }

    /// Human-readable notes for every signal past its notable level, in
    /// signal order and capped at `MAX_FLAGS`.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.predictability > NOTABLE_PREDICTABILITY {
            flags.push(format!("Low perplexity: {}%", self.predictability.round()));
        }
        if self.burstiness > NOTABLE_BURSTINESS {
            flags.push(format!("Uniform sentences: {}%", self.burstiness.round()));
        }
        if self.formality > NOTABLE_FORMALITY {
            flags.push(format!("High formality: {}%", self.formality.round()));
        }
        if self.phrase_count > 0 {
            flags.push(format!("AI phrases: {}", self.phrase_count));
        }
        if self.starters > NOTABLE_STARTERS {
            flags.push("Repetitive structure".to_string());
        }
        flags.truncate(MAX_FLAGS);
        flags
    }
}

/// Ensemble of the five textual signals. Holds no mutable state, so one
/// instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct AiDetector {
    lexicon: Arc<CompiledLexicon>,
}

impl Default for AiDetector {
    fn default() -> Self {
        Self {
            lexicon: BUILTIN_LEXICON.clone(),
        }
    }
}

impl AiDetector {
    pub fn new(lexicon: CompiledLexicon) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    pub fn lexicon(&self) -> &CompiledLexicon {
        &self.lexicon
    }

    pub fn detect(&self, text: &str) -> AiDetection {
        if text.chars().count() < MIN_TEXT_CHARS {
            return AiDetection::human(Vec::new());
        }

        let words = word_count(text);
        if words < MIN_TEXT_WORDS {
            return AiDetection::human(vec!["Too short".to_string()]);
        }

        let sentences = split_sentences(text);
        let predictability = signals::predictability(text, &self.lexicon);
        let burstiness = signals::burstiness(&sentences);
        let formality = signals::formality(text, words, &self.lexicon);
        let phrases = signals::phrase_matches(text, &self.lexicon);
        let starters = signals::sentence_starters(&sentences);

        let scores = SignalScores {
            predictability: predictability.score,
            burstiness: burstiness.score,
            formality: formality.score,
            phrases: phrases.signal.score,
            phrase_count: phrases.count,
            starters: starters.score,
        };
        let confidence = scores.confidence();
        let verdict = Verdict::from_confidence(confidence);

        tracing::debug!(
            confidence,
            %verdict,
            predictability = predictability.score,
            burstiness = burstiness.score,
            formality = formality.score,
            phrases = phrases.count,
            starters = starters.score,
            "ai detection complete"
        );

        AiDetection {
            is_ai: is_flagged(confidence),
            confidence,
            verdict,
            flags: scores.flags(),
            signals: vec![
                predictability,
                burstiness,
                formality,
                phrases.signal,
                starters,
            ],
        }
    }
}
