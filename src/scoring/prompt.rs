/// Grading prompt for cross-checking an answer with a locally hosted model.
/// The rubric scorer stays the source of truth; this only renders text.
pub fn grader_prompt(skill_title: &str, answer: &str) -> String {
    format!(
        r#"You are an impartial grader evaluating a student's answer for the skill: "{skill_title}".

Student's Answer:
"""
{answer}
"""

Evaluate based on these criteria:
- Concept correctness (0-40 points): Is the core concept explained accurately?
- Coverage of key concepts (0-30 points): Are all important aspects mentioned?
- Clarity & reasoning (0-20 points): Is the explanation clear and logical?
- Examples/Insight (0-10 points): Are there practical examples or unique insights?

Return ONLY valid JSON in this exact format:
{{
  "score": <number 0-100>,
  "breakdown": {{
    "concept": <number 0-40>,
    "coverage": <number 0-30>,
    "clarity": <number 0-20>,
    "examples": <number 0-10>
  }},
  "feedback": "<25-40 word constructive feedback>"
}}"#
    )
}
