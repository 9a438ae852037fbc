pub mod detector;
mod evaluate;
pub mod feedback;
pub mod keyphrase;
pub mod normalize;
mod prompt;
pub mod rubric;

pub use detector::{
    AiDetection, AiDetector, DetectionSignal, Lexicon, SignalKind, SignalScores, Verdict,
};
pub use evaluate::{Breakdown, EvaluationMode, EvaluationResult, Evaluator, SKILL_NOT_FOUND};
pub use keyphrase::{score_answer, KeyphraseBreakdown};
pub use normalize::{normalize, NormalizedText};
pub use prompt::grader_prompt;
pub use rubric::{
    Keyphrase, RubricCatalog, RubricError, RubricProvider, RubricRegistry, SkillRubric,
};
