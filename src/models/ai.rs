// src/models/ai.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One labeled choice, e.g. `{"options": "B", "text": "Mitochondria"}`.
/// The label travels under `options` on the wire for frontend compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LabeledOption {
    #[serde(rename = "options", alias = "key")]
    pub label: String,
    pub text: String,
}

/// A generated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<LabeledOption>,
    /// Label of the correct option.
    pub correct_ans: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub original_question: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExplainQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub question: String,
    #[validate(length(min = 1, max = 10))]
    pub options: Vec<LabeledOption>,
    #[validate(length(min = 1, max = 1000))]
    pub correct_answer: String,
    #[validate(length(max = 1000))]
    pub user_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExplanationResponse {
    pub explanation: String,
}
