use super::detector::{AiDetection, AiDetector, Verdict};
use super::feedback::{compose_feedback, FeedbackContext};
use super::keyphrase::{score_answer, KeyphraseBreakdown};
use super::rubric::{RubricProvider, SkillRubric};
use serde::Serialize;
use strum::Display;

pub const SKILL_NOT_FOUND: &str = "Skill not found";

const DEMO_SCORE: u8 = 95;
const DEMO_CONFIDENCE: u8 = 5;
const DEMO_MATCHED: &[&str] = &[
    "distributed ledger",
    "immutable",
    "consensus",
    "decentralized",
    "cryptographic",
];
const DEMO_FEEDBACK: &str = "Excellent response! You've demonstrated a comprehensive understanding of the core concepts. Your explanation is clear, well-structured, and covers all the key points. NFT credential ready to mint!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum EvaluationMode {
    #[default]
    #[strum(serialize = "graded")]
    Graded,
    /// Canned passing result for presentations. Never reaches the engines.
    #[strum(serialize = "demo")]
    Demo,
}

impl EvaluationMode {
    pub fn from_flag(demo: bool) -> Self {
        if demo {
            Self::Demo
        } else {
            Self::Graded
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    #[serde(flatten)]
    pub keyphrases: KeyphraseBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub score: u8,
    pub breakdown: Breakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_detection: Option<AiDetection>,
    pub feedback: String,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub demo_mode: bool,
}

impl EvaluationResult {
    pub fn rubric_not_found() -> Self {
        Self {
            score: 0,
            breakdown: Breakdown {
                error: Some(SKILL_NOT_FOUND.to_string()),
                ..Default::default()
            },
            ai_detection: None,
            feedback: "Error: Skill rubric not found.".to_string(),
            pass: false,
            threshold: None,
            demo_mode: false,
        }
    }

    pub fn demo() -> Self {
        Self {
            score: DEMO_SCORE,
            breakdown: Breakdown {
                keyphrases: KeyphraseBreakdown {
                    keyphrase_score: 85,
                    coherence_score: 10,
                    penalty: 0,
                    matched: DEMO_MATCHED.iter().map(|s| s.to_string()).collect(),
                    missed: Vec::new(),
                    word_count: 0,
                },
                error: None,
            },
            ai_detection: Some(AiDetection {
                is_ai: false,
                confidence: DEMO_CONFIDENCE,
                verdict: Verdict::Human,
                flags: Vec::new(),
                signals: Vec::new(),
            }),
            feedback: DEMO_FEEDBACK.to_string(),
            pass: true,
            threshold: None,
            demo_mode: true,
        }
    }

    pub fn is_rubric_not_found(&self) -> bool {
        self.breakdown.error.is_some()
    }
}

/// Runs the keyphrase scorer and the AI detector over one answer and applies
/// the pass policy.
pub struct Evaluator<P> {
    rubrics: P,
    detector: AiDetector,
}

impl<P: RubricProvider> Evaluator<P> {
    pub fn new(rubrics: P, detector: AiDetector) -> Self {
        Self { rubrics, detector }
    }

    pub fn with_builtin_lexicon(rubrics: P) -> Self {
        Self::new(rubrics, AiDetector::default())
    }

    pub fn rubrics(&self) -> &P {
        &self.rubrics
    }

    pub fn evaluate(&self, skill_id: &str, answer: &str, mode: EvaluationMode) -> EvaluationResult {
        if mode == EvaluationMode::Demo {
            tracing::debug!(skill_id, "demo evaluation short-circuited");
            return EvaluationResult::demo();
        }

        let Some(rubric) = self.rubrics.rubric(skill_id) else {
            tracing::warn!(skill_id, "rubric not found");
            return EvaluationResult::rubric_not_found();
        };

        self.grade(&rubric, answer)
    }

    pub fn grade(&self, rubric: &SkillRubric, answer: &str) -> EvaluationResult {
        let keyphrases = score_answer(rubric, answer);
        let detection = self.detector.detect(answer);

        let score = keyphrases.raw_score().clamp(0, 100) as u8;
        let pass = score >= rubric.pass_threshold && !detection.is_ai;

        let feedback = compose_feedback(&FeedbackContext {
            skill_title: &rubric.title,
            threshold: rubric.pass_threshold,
            score,
            pass,
            breakdown: &keyphrases,
            detection: &detection,
        });

        tracing::info!(
            skill_id = %rubric.id,
            score,
            pass,
            threshold = rubric.pass_threshold,
            verdict = %detection.verdict,
            confidence = detection.confidence,
            "answer evaluated"
        );

        EvaluationResult {
            score,
            breakdown: Breakdown {
                keyphrases,
                error: None,
            },
            ai_detection: Some(detection),
            feedback,
            pass,
            threshold: Some(rubric.pass_threshold),
            demo_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::rubric::Keyphrase;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn evaluator() -> Evaluator<HashMap<String, Arc<SkillRubric>>> {
        let rubric = SkillRubric::new(
            "blockchain-basics",
            "Blockchain Fundamentals",
            60,
            vec![
                Keyphrase::new("consensus", 30),
                Keyphrase::new("immutable", 30),
                Keyphrase::new("decentralized", 30),
            ],
        );
        let mut rubrics = HashMap::new();
        rubrics.insert(rubric.id.clone(), Arc::new(rubric));
        Evaluator::with_builtin_lexicon(rubrics)
    }

    #[test]
    fn test_unknown_skill() {
        let result = evaluator().evaluate("nope", "whatever", EvaluationMode::Graded);
        assert_eq!(result.score, 0);
        assert!(!result.pass);
        assert!(result.is_rubric_not_found());
        assert_eq!(result.breakdown.error.as_deref(), Some(SKILL_NOT_FOUND));
        assert!(result.ai_detection.is_none());
    }

    #[test]
    fn test_demo_bypasses_rubric_lookup() {
        let result = evaluator().evaluate("nope", "", EvaluationMode::Demo);
        assert!(result.pass);
        assert!(result.demo_mode);
        assert_eq!(result.score, 95);
        assert_eq!(result.breakdown.keyphrases.matched.len(), 5);
    }

    #[test]
    fn test_empty_answer_fails() {
        let result = evaluator().evaluate("blockchain-basics", "", EvaluationMode::Graded);
        assert_eq!(result.score, 0);
        assert_eq!(result.breakdown.keyphrases.penalty, 10);
        assert!(!result.pass);
        assert_eq!(result.threshold, Some(60));
    }

    #[test]
    fn test_short_answer_score_clamped_at_zero() {
        let result = evaluator().evaluate("blockchain-basics", "no idea", EvaluationMode::Graded);
        assert_eq!(result.breakdown.keyphrases.raw_score(), -10);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(EvaluationMode::from_flag(true), EvaluationMode::Demo);
        assert_eq!(EvaluationMode::from_flag(false), EvaluationMode::Graded);
        assert_eq!(EvaluationMode::default(), EvaluationMode::Graded);
    }

    #[test]
    fn test_json_shape() {
        let result = evaluator().evaluate("blockchain-basics", "consensus", EvaluationMode::Graded);
        let json = serde_json::to_value(&result).unwrap();
        for key in ["score", "breakdown", "aiDetection", "feedback", "pass", "threshold"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("demoMode").is_none());
        assert_eq!(json["breakdown"]["keyphrases"], 30);
        assert_eq!(json["breakdown"]["wordCount"], 1);
        assert_eq!(json["aiDetection"]["isAI"], false);
        assert_eq!(json["aiDetection"]["verdict"], "human");
    }

    #[test]
    fn test_not_found_json_shape() {
        let json = serde_json::to_value(EvaluationResult::rubric_not_found()).unwrap();
        assert_eq!(json["breakdown"]["error"], SKILL_NOT_FOUND);
        assert!(json.get("aiDetection").is_none());
        assert!(json.get("threshold").is_none());
    }
}
