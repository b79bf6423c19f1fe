// src/repository/academics.rs

use sqlx::SqliteConnection;

use crate::models::academic::{ClassLevel, Department, University};

pub async fn list_universities(conn: &mut SqliteConnection) -> Result<Vec<University>, sqlx::Error> {
    sqlx::query_as::<_, University>("SELECT id, name FROM universities ORDER BY name, id")
        .fetch_all(&mut *conn)
        .await
}

pub async fn create_university(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<University, sqlx::Error> {
    sqlx::query_as::<_, University>("INSERT INTO universities (name) VALUES (?) RETURNING id, name")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
}

pub async fn university_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM universities WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

/// Departments of one university. Empty when it has none or does not exist.
pub async fn list_departments(
    conn: &mut SqliteConnection,
    university_id: i64,
) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, name, university_id FROM departments WHERE university_id = ? ORDER BY name, id",
    )
    .bind(university_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn create_department(
    conn: &mut SqliteConnection,
    name: &str,
    university_id: i64,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "INSERT INTO departments (name, university_id) VALUES (?, ?) RETURNING id, name, university_id",
    )
    .bind(name)
    .bind(university_id)
    .fetch_one(&mut *conn)
    .await
}

pub async fn department_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

/// Class levels of one department, lowest first.
pub async fn list_class_levels(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Vec<ClassLevel>, sqlx::Error> {
    sqlx::query_as::<_, ClassLevel>(
        "SELECT id, level, department_id FROM class_levels WHERE department_id = ? ORDER BY level, id",
    )
    .bind(department_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn create_class_level(
    conn: &mut SqliteConnection,
    level: i32,
    department_id: i64,
) -> Result<ClassLevel, sqlx::Error> {
    sqlx::query_as::<_, ClassLevel>(
        "INSERT INTO class_levels (level, department_id) VALUES (?, ?) RETURNING id, level, department_id",
    )
    .bind(level)
    .bind(department_id)
    .fetch_one(&mut *conn)
    .await
}
