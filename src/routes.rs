// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{academics, ai, auth, exams},
    openapi::openapi_json,
    state::AppState,
};

async fn root() -> Json<Value> {
    Json(json!({ "message": "Past Exams API is running" }))
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, exams, academics).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, AI client).
///
/// Protected routes take an [`AuthUser`](crate::utils::jwt::AuthUser)
/// argument instead of sitting behind a middleware layer, so public and
/// protected methods can share a path.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/me",
            get(auth::me).put(auth::update_me).delete(auth::delete_me),
        );

    let exam_routes = Router::new()
        .route("/", get(exams::list_exams).post(exams::create_exam))
        .route(
            "/generate-similar-question",
            post(ai::generate_similar_question),
        )
        .route("/explain-question", post(ai::explain_question))
        .route("/{id}", get(exams::get_exam).delete(exams::delete_exam))
        .route("/{id}/questions", get(exams::get_exam_questions))
        .route("/{id}/upload-questions", post(exams::upload_questions));

    let academic_routes = Router::new()
        .route(
            "/universities",
            get(academics::list_universities).post(academics::create_university),
        )
        .route(
            "/universities/{id}/departments",
            get(academics::list_departments),
        )
        .route("/departments", post(academics::create_department))
        .route("/departments/{id}/classes", get(academics::list_class_levels))
        .route("/class-levels", post(academics::create_class_level));

    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/auth", auth_routes)
        .nest("/exams", exam_routes)
        .nest("/academics", academic_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
