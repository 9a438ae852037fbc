use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::scoring::{EvaluationMode, EvaluationResult, Evaluator, RubricRegistry};
use crate::settings::Server;
use crate::utils::log_evaluation_served;

pub const MIN_ANSWER_CHARS: usize = 10;

pub type SharedEvaluator = Arc<Evaluator<Arc<RubricRegistry>>>;

#[derive(Clone)]
pub struct AppState {
    pub evaluator: SharedEvaluator,
    pub server: Server,
}

impl AppState {
    pub fn new(evaluator: SharedEvaluator, server: Server) -> Self {
        Self { evaluator, server }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("skillId is required")]
    MissingSkillId,
    #[error("answer is required")]
    MissingAnswer,
    #[error("Answer is too short. Please provide more detail.")]
    AnswerTooShort,
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingSkillId
            | ApiError::MissingAnswer
            | ApiError::AnswerTooShort
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidBody(value.body_text())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    #[serde(default)]
    pub demo: Option<String>,
}

impl EvaluateRequest {
    /// Checks presence and minimum length, returning the skill id and answer.
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let skill_id = self
            .skill_id
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::MissingSkillId)?;
        let answer = self
            .answer
            .filter(|a| !a.is_empty())
            .ok_or(ApiError::MissingAnswer)?;
        if answer.trim().chars().count() < MIN_ANSWER_CHARS {
            return Err(ApiError::AnswerTooShort);
        }
        Ok((skill_id, answer))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub difficulty: String,
    pub pass_threshold: u8,
    pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsResponse {
    pub version: String,
    pub loaded_at: DateTime<Utc>,
    pub skills: Vec<SkillSummary>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck).fallback(method_not_allowed))
        .route("/api/skills", get(skills_handler).fallback(method_not_allowed))
        .route("/api/evaluate", post(evaluate_handler).fallback(method_not_allowed))
        .with_state(state)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn skills_handler(State(state): State<AppState>) -> Json<SkillsResponse> {
    let catalog = state.evaluator.rubrics().snapshot();
    let skills = catalog
        .iter()
        .map(|rubric| SkillSummary {
            id: rubric.id.clone(),
            title: rubric.title.clone(),
            category: rubric.category.clone(),
            difficulty: rubric.difficulty.clone(),
            pass_threshold: rubric.pass_threshold,
            question: rubric.question.clone(),
        })
        .collect();

    Json(SkillsResponse {
        version: catalog.version().to_string(),
        loaded_at: catalog.loaded_at(),
        skills,
    })
}

pub async fn evaluate_handler(
    State(state): State<AppState>,
    Query(query): Query<EvaluateQuery>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let Json(request) = payload?;
    let (skill_id, answer) = request.validate()?;

    let demo = state.server.demo_mode || query.demo.as_deref() == Some("true");
    let mode = EvaluationMode::from_flag(demo);

    let delay_ms = match mode {
        EvaluationMode::Demo => state.server.demo_delay_ms,
        EvaluationMode::Graded => state.server.evaluation_delay_ms,
    };
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let result = state.evaluator.evaluate(&skill_id, &answer, mode);
    log_evaluation_served(&skill_id, &result);

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(skill_id: Option<&str>, answer: Option<&str>) -> EvaluateRequest {
        EvaluateRequest {
            skill_id: skill_id.map(str::to_string),
            answer: answer.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_requires_skill_id() {
        let err = request(None, Some("a long enough answer")).validate().unwrap_err();
        assert_eq!(err.to_string(), "skillId is required");
        let err = request(Some(""), Some("a long enough answer")).validate().unwrap_err();
        assert!(matches!(err, ApiError::MissingSkillId));
    }

    #[test]
    fn test_validate_requires_answer() {
        let err = request(Some("smart-contracts"), None).validate().unwrap_err();
        assert_eq!(err.to_string(), "answer is required");
        let err = request(Some("smart-contracts"), Some("")).validate().unwrap_err();
        assert!(matches!(err, ApiError::MissingAnswer));
    }

    #[test]
    fn test_validate_trims_before_length_check() {
        let err = request(Some("smart-contracts"), Some("   short    "))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ApiError::AnswerTooShort));

        let (skill, answer) = request(Some("smart-contracts"), Some("ten chars!"))
            .validate()
            .unwrap();
        assert_eq!(skill, "smart-contracts");
        assert_eq!(answer, "ten chars!");
    }

    #[test]
    fn test_api_error_is_bad_request() {
        let response = ApiError::AnswerTooShort.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_method_not_allowed_status() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
