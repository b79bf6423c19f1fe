// src/handlers/ai.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    ai::{self, TextGenerator},
    error::AppError,
    models::ai::{ExplainQuestionRequest, ExplanationResponse, GenerateQuestionRequest, GeneratedQuestion},
    utils::extract::JsonBody,
};

/// Generates a new multiple-choice question similar to the one supplied.
///
/// Nothing is stored; the client decides whether to upload the result.
#[utoipa::path(
    post,
    path = "/exams/generate-similar-question",
    tag = "ai",
    request_body = GenerateQuestionRequest,
    responses(
        (status = 200, description = "Generated question", body = GeneratedQuestion),
        (status = 400, description = "Validation failed"),
        (status = 503, description = "AI provider failed or replied with an unusable answer")
    )
)]
pub async fn generate_similar_question(
    State(generator): State<Arc<dyn TextGenerator>>,
    JsonBody(payload): JsonBody<GenerateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let generated = ai::generate_similar_question(generator.as_ref(), &payload.original_question).await?;

    Ok(Json(generated))
}

/// Explains a multiple-choice question, adapted to whether the user's
/// answer was right, wrong or missing.
#[utoipa::path(
    post,
    path = "/exams/explain-question",
    tag = "ai",
    request_body = ExplainQuestionRequest,
    responses(
        (status = 200, description = "Explanation text", body = ExplanationResponse),
        (status = 400, description = "Validation failed"),
        (status = 503, description = "AI provider failed or replied with an unusable answer")
    )
)]
pub async fn explain_question(
    State(generator): State<Arc<dyn TextGenerator>>,
    JsonBody(payload): JsonBody<ExplainQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let explanation = ai::explain_question(generator.as_ref(), &payload).await?;

    Ok(Json(explanation))
}
