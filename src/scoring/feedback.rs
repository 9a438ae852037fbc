use super::detector::{AiDetection, Verdict};
use super::keyphrase::{KeyphraseBreakdown, SHORT_ANSWER_WORDS};

pub const OUTSTANDING_SCORE: u8 = 85;
pub const GOOD_SCORE: u8 = 70;
pub const COMPLETE_SCORE: u8 = 90;

const COVERED_LIMIT: usize = 3;
const SUGGESTED_LIMIT: usize = 2;
const MISSING_LIMIT: usize = 3;

/// Inputs to the feedback decision tree.
pub struct FeedbackContext<'a> {
    pub skill_title: &'a str,
    pub threshold: u8,
    pub score: u8,
    pub pass: bool,
    pub breakdown: &'a KeyphraseBreakdown,
    pub detection: &'a AiDetection,
}

fn first(items: &[String], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn compose_feedback(ctx: &FeedbackContext<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let detection = ctx.detection;

    if detection.is_ai {
        parts.push(format!(
            "AI-generated content detected ({}% confidence). Your answer reads like the output of ChatGPT or a similar model. Please write your own answer to earn a credential.",
            detection.confidence
        ));
    } else if matches!(detection.verdict, Verdict::Mixed | Verdict::LikelyAi) {
        parts.push(format!(
            "Note: some patterns in your answer raised minor flags ({}% AI similarity), but your response is accepted.",
            detection.confidence
        ));
    }

    let breakdown = ctx.breakdown;
    if ctx.pass {
        parts.push(if ctx.score >= OUTSTANDING_SCORE {
            format!(
                "Outstanding! You've demonstrated excellent understanding of {}.",
                ctx.skill_title
            )
        } else if ctx.score >= GOOD_SCORE {
            "Good work! You've shown a solid grasp of the key concepts.".to_string()
        } else {
            "You've passed with the minimum required score.".to_string()
        });

        if !breakdown.matched.is_empty() {
            parts.push(format!(
                "Key concepts covered: {}.",
                first(&breakdown.matched, COVERED_LIMIT)
            ));
        }
        if !breakdown.missed.is_empty() && ctx.score < COMPLETE_SCORE {
            parts.push(format!(
                "Consider also discussing: {}.",
                first(&breakdown.missed, SUGGESTED_LIMIT)
            ));
        }
    } else if detection.is_ai {
        parts.push(
            "Credential denied due to AI-generated content. Please rewrite your answer in your own words."
                .to_string(),
        );
    } else {
        if breakdown.missed.is_empty() {
            parts.push("Not quite there yet. Your answer needs more depth.".to_string());
        } else {
            parts.push(format!(
                "Not quite there yet. Your answer needs more detail on: {}.",
                first(&breakdown.missed, MISSING_LIMIT)
            ));
        }
        if breakdown.word_count < SHORT_ANSWER_WORDS {
            parts.push(format!(
                "Your response is too brief ({} words). Aim for at least 50-100 words.",
                breakdown.word_count
            ));
        }
        parts.push(format!(
            "Required score: {}, your score: {}.",
            ctx.threshold, ctx.score
        ));
    }

    parts.join(" ")
}
