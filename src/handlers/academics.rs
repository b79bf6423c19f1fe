// src/handlers/academics.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::academic::{
        ClassLevel, CreateClassLevelRequest, CreateDepartmentRequest, CreateUniversityRequest,
        Department, University,
    },
    repository::academics,
    utils::{extract::JsonBody, jwt::AuthUser},
};

#[utoipa::path(
    get,
    path = "/academics/universities",
    tag = "academics",
    responses((status = 200, description = "All universities, by name", body = Vec<University>))
)]
pub async fn list_universities(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let universities = academics::list_universities(&mut conn).await?;
    Ok(Json(universities))
}

/// Adds a university. Names are unique.
#[utoipa::path(
    post,
    path = "/academics/universities",
    tag = "academics",
    security(("bearer" = [])),
    request_body = CreateUniversityRequest,
    responses(
        (status = 201, description = "University created", body = University),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_university(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<CreateUniversityRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload.name.trim();
    let mut conn = pool.acquire().await?;

    let university = academics::create_university(&mut conn, name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("University '{}' already exists", name))
            } else {
                AppError::from(e)
            }
        })?;

    tracing::info!(user_id = user.id, university_id = university.id, "University created");

    Ok((StatusCode::CREATED, Json(university)))
}

#[utoipa::path(
    get,
    path = "/academics/universities/{id}/departments",
    tag = "academics",
    params(("id" = i64, Path, description = "University id")),
    responses(
        (status = 200, description = "Departments of the university", body = Vec<Department>),
        (status = 404, description = "University not found")
    )
)]
pub async fn list_departments(
    State(pool): State<SqlitePool>,
    Path(university_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    if !academics::university_exists(&mut conn, university_id).await? {
        return Err(AppError::NotFound("University not found".to_string()));
    }

    let departments = academics::list_departments(&mut conn, university_id).await?;
    Ok(Json(departments))
}

#[utoipa::path(
    post,
    path = "/academics/departments",
    tag = "academics",
    security(("bearer" = [])),
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 404, description = "University not found")
    )
)]
pub async fn create_department(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<CreateDepartmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = pool.acquire().await?;

    if !academics::university_exists(&mut conn, payload.university_id).await? {
        return Err(AppError::NotFound("University not found".to_string()));
    }

    let department =
        academics::create_department(&mut conn, payload.name.trim(), payload.university_id).await?;

    tracing::info!(user_id = user.id, department_id = department.id, "Department created");

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    get,
    path = "/academics/departments/{id}/classes",
    tag = "academics",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Class levels of the department, lowest first", body = Vec<ClassLevel>),
        (status = 404, description = "Department not found")
    )
)]
pub async fn list_class_levels(
    State(pool): State<SqlitePool>,
    Path(department_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    if !academics::department_exists(&mut conn, department_id).await? {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let levels = academics::list_class_levels(&mut conn, department_id).await?;
    Ok(Json(levels))
}

#[utoipa::path(
    post,
    path = "/academics/class-levels",
    tag = "academics",
    security(("bearer" = [])),
    request_body = CreateClassLevelRequest,
    responses(
        (status = 201, description = "Class level created", body = ClassLevel),
        (status = 404, description = "Department not found")
    )
)]
pub async fn create_class_level(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<CreateClassLevelRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = pool.acquire().await?;

    if !academics::department_exists(&mut conn, payload.department_id).await? {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let level =
        academics::create_class_level(&mut conn, payload.level, payload.department_id).await?;

    tracing::info!(user_id = user.id, class_level_id = level.id, "Class level created");

    Ok((StatusCode::CREATED, Json(level)))
}
