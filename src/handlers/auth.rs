// src/handlers/auth.rs

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{CreateUserRequest, LoginRequest, TokenResponse, UpdateUserRequest, User},
    repository::users,
    utils::{
        extract::JsonBody,
        hash::hash_password,
        jwt::{AuthUser, sign_jwt},
    },
};

/// Login credentials read from either a JSON body or an urlencoded form,
/// depending on the request's content type.
#[derive(Debug)]
pub struct LoginPayload(pub LoginRequest);

impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let payload = if is_form {
            let Form(payload) = Form::<LoginRequest>::from_request(req, state).await?;
            payload
        } else {
            let JsonBody(payload) = JsonBody::<LoginRequest>::from_request(req, state).await?;
            payload
        };

        Ok(LoginPayload(payload))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Maps a failed user write to a conflict naming the clashing field.
fn user_write_error(err: sqlx::Error, username: &str, email: &str) -> AppError {
    if is_unique_violation(&err) {
        let on_email = err
            .as_database_error()
            .is_some_and(|db_err| db_err.message().contains("users.email"));
        if on_email {
            return AppError::Conflict(format!("Email '{}' is already registered", email));
        }
        return AppError::Conflict(format!("Username '{}' already exists", username));
    }
    tracing::error!("Failed to write user: {:?}", err);
    AppError::from(err)
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(pool): State<SqlitePool>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let username = payload.username.trim();
    let email = normalize_email(&payload.email);

    let mut conn = pool.acquire().await?;

    if users::find_by_username(&mut conn, username).await?.is_some() {
        return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
    }
    if users::find_by_email(&mut conn, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("Email '{}' is already registered", email)));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = users::create_user(&mut conn, username, &email, &hashed_password)
        .await
        .map_err(|e| user_write_error(e, username, &email))?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a bearer token.
///
/// `username` may be the username or the email address. Every failure is the
/// same 401, whether the account is unknown or the password is wrong.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    LoginPayload(payload): LoginPayload,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        return Err(AppError::invalid_credentials());
    }

    let mut conn = pool.acquire().await?;
    let user = users::authenticate(&mut conn, &payload.username, &payload.password).await?;

    let token = sign_jwt(&user.username, &config)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Returns the authenticated user.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// Changes the authenticated user's email and/or password.
#[utoipa::path(
    put,
    path = "/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation failed or nothing to update"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_me(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.email.is_none() && payload.password.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let email = payload.email.as_deref().map(normalize_email);
    let hashed_password = payload.password.as_deref().map(hash_password).transpose()?;

    let mut conn = pool.acquire().await?;

    if let Some(email) = &email {
        if let Some(existing) = users::find_by_email(&mut conn, email).await? {
            if existing.id != user.id {
                return Err(AppError::Conflict(format!("Email '{}' is already registered", email)));
            }
        }
    }

    let updated = users::update_user(&mut conn, user.id, email.as_deref(), hashed_password.as_deref())
        .await
        .map_err(|e| user_write_error(e, &user.username, email.as_deref().unwrap_or_default()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "User updated");

    Ok(Json(updated))
}

/// Deletes the authenticated user together with their exams.
#[utoipa::path(
    delete,
    path = "/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_me(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    if !users::delete_user(&mut conn, user.id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = user.id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
