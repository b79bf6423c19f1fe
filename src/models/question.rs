// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Question {
    pub id: i64,

    pub exam_id: i64,

    /// The text content of the question.
    pub question_text: String,

    /// The correct answer key or content.
    pub answer: String,

    /// List of choices (e.g., ["Option A", "Option B"]), absent for open questions.
    /// Stored as a JSON array in the database.
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<Json<Vec<String>>>,
}

/// DTO for creating a question, either nested in a new exam or uploaded in bulk.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 1000))]
    pub answer: String,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
}

/// A bulk upload, validated as a whole so every bad entry is reported with
/// its index.
#[derive(Debug, Validate)]
pub struct QuestionBatch {
    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    if options.len() > 10 {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_blank"));
        }
        if opt.len() > 1000 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
