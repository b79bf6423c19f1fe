// src/openapi.rs

use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{academics, ai, auth, exams},
    models::{
        academic::{
            ClassLevel, CreateClassLevelRequest, CreateDepartmentRequest, CreateUniversityRequest,
            Department, University,
        },
        ai::{ExplainQuestionRequest, ExplanationResponse, GenerateQuestionRequest, GeneratedQuestion, LabeledOption},
        exam::{CreateExamRequest, Exam, ExamWithQuestions},
        question::{CreateQuestionRequest, Question},
        user::{CreateUserRequest, LoginRequest, TokenResponse, UpdateUserRequest, User},
    },
};

/// OpenAPI document assembled from the handler annotations.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Past Exams API",
        description = "Share past exam papers, browse them by university, department and class level, and study with AI help"
    ),
    paths(
        auth::register,
        auth::login,
        auth::me,
        auth::update_me,
        auth::delete_me,
        exams::create_exam,
        exams::list_exams,
        exams::get_exam,
        exams::delete_exam,
        exams::get_exam_questions,
        exams::upload_questions,
        ai::generate_similar_question,
        ai::explain_question,
        academics::list_universities,
        academics::create_university,
        academics::list_departments,
        academics::create_department,
        academics::list_class_levels,
        academics::create_class_level,
    ),
    components(schemas(
        User, CreateUserRequest, LoginRequest, UpdateUserRequest, TokenResponse,
        Exam, ExamWithQuestions, CreateExamRequest,
        Question, CreateQuestionRequest,
        University, Department, ClassLevel,
        CreateUniversityRequest, CreateDepartmentRequest, CreateClassLevelRequest,
        LabeledOption, GeneratedQuestion, GenerateQuestionRequest,
        ExplainQuestionRequest, ExplanationResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and the caller's account"),
        (name = "exams", description = "Exam papers and their questions"),
        (name = "academics", description = "University, department and class level hierarchy"),
        (name = "ai", description = "AI study assistance")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
