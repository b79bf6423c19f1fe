// src/handlers/exams.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam::{CreateExamRequest, ExamQuery, ExamWithQuestions},
        question::{CreateQuestionRequest, Question, QuestionBatch},
    },
    repository::{exams, questions},
    utils::{extract::JsonBody, jwt::AuthUser},
};

fn exam_not_found() -> AppError {
    AppError::NotFound("Exam not found".to_string())
}

/// Uploads a new exam owned by the caller, with its initial questions.
///
/// The exam row and every question are written in one transaction.
#[utoipa::path(
    post,
    path = "/exams",
    tag = "exams",
    security(("bearer" = [])),
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam created", body = ExamWithQuestions),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Referenced university, department or class level does not exist")
    )
)]
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = pool.begin().await?;

    let created = exams::create_exam(&mut tx, user.id, &payload)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound(
                "Referenced university, department or class level does not exist".to_string(),
            ),
            other => other,
        })?;

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        exam_id = created.exam.id,
        questions = created.questions.len(),
        "Exam created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists exams, each with its questions.
///
/// Without filters the listing is paginated by `skip`/`limit`. With any
/// filter present every match is returned.
#[utoipa::path(
    get,
    path = "/exams",
    tag = "exams",
    params(ExamQuery),
    responses(
        (status = 200, description = "Matching exams, oldest first", body = Vec<ExamWithQuestions>)
    )
)]
pub async fn list_exams(
    State(pool): State<SqlitePool>,
    Query(query): Query<ExamQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter();
    let mut conn = pool.acquire().await?;

    let rows = if filter.is_empty() {
        let (skip, limit) = query.page();
        exams::list_exams(&mut conn, skip, limit).await?
    } else {
        exams::search_exams(&mut conn, &filter).await?
    };

    let result = exams::attach_questions(&mut conn, rows).await?;

    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/exams/{id}",
    tag = "exams",
    params(("id" = i64, Path, description = "Exam id")),
    responses(
        (status = 200, description = "Exam with its questions", body = ExamWithQuestions),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn get_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    let exam = exams::get_exam_with_questions(&mut conn, id)
        .await?
        .ok_or_else(exam_not_found)?;

    Ok(Json(exam))
}

/// Deletes an exam. Only its owner may do so; questions go with it.
#[utoipa::path(
    delete,
    path = "/exams/{id}",
    tag = "exams",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Exam id")),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 403, description = "Caller does not own the exam"),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn delete_exam(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    let exam = exams::get_exam(&mut conn, id).await?.ok_or_else(exam_not_found)?;

    if exam.user_id != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to delete this exam".to_string(),
        ));
    }

    if !exams::delete_exam(&mut conn, id).await? {
        return Err(exam_not_found());
    }

    tracing::info!(user_id = user.id, exam_id = id, "Exam deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/exams/{id}/questions",
    tag = "exams",
    params(("id" = i64, Path, description = "Exam id")),
    responses(
        (status = 200, description = "Questions in insertion order", body = Vec<Question>),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn get_exam_questions(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    if !exams::exam_exists(&mut conn, id).await? {
        return Err(exam_not_found());
    }

    let questions = questions::questions_for_exam(&mut conn, id).await?;

    Ok(Json(questions))
}

/// Appends a batch of questions to an exam the caller owns.
///
/// All or nothing: one invalid entry rejects the whole batch and nothing is
/// stored.
#[utoipa::path(
    post,
    path = "/exams/{id}/upload-questions",
    tag = "exams",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Exam id")),
    request_body = Vec<CreateQuestionRequest>,
    responses(
        (status = 201, description = "Stored questions", body = Vec<Question>),
        (status = 400, description = "At least one entry failed validation"),
        (status = 403, description = "Caller does not own the exam"),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn upload_questions(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<Vec<CreateQuestionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let exam = exams::get_exam(&mut tx, id).await?.ok_or_else(exam_not_found)?;
    if exam.user_id != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to add questions to this exam".to_string(),
        ));
    }

    let batch = QuestionBatch { questions: payload };
    batch.validate()?;

    let created = questions::insert_questions(&mut tx, id, &batch.questions).await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, exam_id = id, count = created.len(), "Questions uploaded");

    Ok((StatusCode::CREATED, Json(created)))
}
