// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    config::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
    models::question::{CreateQuestionRequest, Question},
};

/// Represents the 'exams' table in the database.
/// The academic tags are denormalized onto the row so searches never join.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub course_name: String,
    pub year: i32,
    /// Free-form term label, e.g. "Fall" or "Güz".
    pub semester: String,
    /// Owner.
    pub user_id: i64,
    pub university_id: Option<i64>,
    pub department_id: Option<i64>,
    pub class_level_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An exam together with its questions, in insertion order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExamWithQuestions {
    #[serde(flatten)]
    pub exam: Exam,
    pub questions: Vec<Question>,
}

/// DTO for uploading a new exam with its initial question set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub course_name: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[validate(length(min = 1, max = 50))]
    pub semester: String,
    pub university_id: Option<i64>,
    pub department_id: Option<i64>,
    pub class_level_id: Option<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

/// Search criteria. Every field is optional; present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamFilter {
    pub university_id: Option<i64>,
    pub department_id: Option<i64>,
    pub class_level_id: Option<i64>,
    /// Case-insensitive substring of the course name.
    pub course_name: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
}

impl ExamFilter {
    pub fn is_empty(&self) -> bool {
        *self == ExamFilter::default()
    }

    /// The whole predicate, evaluated in memory.
    pub fn matches(&self, exam: &Exam) -> bool {
        self.university_id.is_none_or(|id| exam.university_id == Some(id))
            && self.department_id.is_none_or(|id| exam.department_id == Some(id))
            && self.class_level_id.is_none_or(|id| exam.class_level_id == Some(id))
            && self.year.is_none_or(|year| exam.year == year)
            && self.semester.as_deref().is_none_or(|s| exam.semester == s)
            && self.matches_course(exam)
    }

    /// Substring test on the course name, case-folded with [`fold_case`]
    /// (SQLite's LIKE only folds ASCII).
    pub fn matches_course(&self, exam: &Exam) -> bool {
        match self.course_name.as_deref() {
            None => true,
            Some(needle) => fold_case(&exam.course_name).contains(&fold_case(needle)),
        }
    }
}

/// Unicode lowercase with the Turkish dotted/dotless i pair collapsed.
///
/// `İ` lowercases to `i` + U+0307 and `I` to `i`, while `ı` stays as is, so
/// the combining dot is dropped and `ı` is mapped to `i`.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|&c| c != '\u{307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// Query string accepted by `GET /exams`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamQuery {
    pub university_id: Option<i64>,
    pub department_id: Option<i64>,
    pub class_level_id: Option<i64>,
    pub course_name: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    /// Rows to skip in the unfiltered listing.
    pub skip: Option<i64>,
    /// Page size for the unfiltered listing.
    pub limit: Option<i64>,
}

impl ExamQuery {
    /// Blank text parameters are treated as absent.
    pub fn filter(&self) -> ExamFilter {
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        ExamFilter {
            university_id: self.university_id,
            department_id: self.department_id,
            class_level_id: self.class_level_id,
            course_name: non_blank(&self.course_name),
            year: self.year,
            semester: non_blank(&self.semester),
        }
    }

    /// `(skip, limit)` clamped to sane bounds.
    pub fn page(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (skip, limit)
    }
}
