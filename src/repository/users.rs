// src/repository/users.rs

use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::user::User,
    utils::hash::{verify_dummy, verify_password},
};

pub async fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    hashed_password: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, hashed_password)
        VALUES (?, ?, ?)
        RETURNING id, username, email, hashed_password, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .fetch_one(&mut *conn)
    .await
}

pub async fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, hashed_password, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, hashed_password, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await
}

/// Changes email and/or password hash; `None` keeps the stored value.
/// Returns `None` when the user does not exist.
pub async fn update_user(
    conn: &mut SqliteConnection,
    id: i64,
    email: Option<&str>,
    hashed_password: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE(?, email),
            hashed_password = COALESCE(?, hashed_password)
        WHERE id = ?
        RETURNING id, username, email, hashed_password, created_at
        "#,
    )
    .bind(email)
    .bind(hashed_password)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Deletes the user; their exams and those exams' questions go with them.
pub async fn delete_user(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Resolves `identifier` (an email if it contains `@`, otherwise a username)
/// and checks `password` against the stored hash.
///
/// Unknown account and wrong password fail identically.
pub async fn authenticate(
    conn: &mut SqliteConnection,
    identifier: &str,
    password: &str,
) -> Result<User, AppError> {
    let identifier = identifier.trim();
    let user = if identifier.contains('@') {
        find_by_email(conn, &identifier.to_lowercase()).await?
    } else {
        find_by_username(conn, identifier).await?
    };

    match user {
        Some(user) if verify_password(password, &user.hashed_password)? => Ok(user),
        Some(_) => Err(AppError::invalid_credentials()),
        None => {
            verify_dummy(password);
            Err(AppError::invalid_credentials())
        }
    }
}
