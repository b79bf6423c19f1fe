// src/models/academic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'universities' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct University {
    pub id: i64,
    /// Unique display name.
    pub name: String,
}

/// Represents the 'departments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub university_id: i64,
}

/// Represents the 'class_levels' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ClassLevel {
    pub id: i64,
    /// Year of study, 1 for freshmen.
    pub level: i32,
    pub department_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUniversityRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub university_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassLevelRequest {
    #[validate(range(min = 1, max = 12))]
    pub level: i32,
    pub department_id: i64,
}
