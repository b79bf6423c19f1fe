// src/repository/exams.rs

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    models::exam::{CreateExamRequest, Exam, ExamFilter, ExamWithQuestions},
    repository::questions,
};

const EXAM_COLUMNS: &str = "id, title, description, course_name, year, semester, user_id, \
     university_id, department_id, class_level_id, created_at";

/// Inserts the exam row, then all of its questions.
///
/// Callers run this inside a single transaction so a failed question insert
/// never leaves an exam without its questions.
pub async fn create_exam(
    conn: &mut SqliteConnection,
    owner_id: i64,
    exam: &CreateExamRequest,
) -> Result<ExamWithQuestions, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO exams
        (title, description, course_name, year, semester, user_id, university_id, department_id, class_level_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {EXAM_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, Exam>(&sql)
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(&exam.course_name)
        .bind(exam.year)
        .bind(&exam.semester)
        .bind(owner_id)
        .bind(exam.university_id)
        .bind(exam.department_id)
        .bind(exam.class_level_id)
        .fetch_one(&mut *conn)
        .await?;

    let questions = questions::insert_questions(conn, row.id, &exam.questions).await?;

    Ok(ExamWithQuestions {
        exam: row,
        questions,
    })
}

pub async fn get_exam(conn: &mut SqliteConnection, id: i64) -> Result<Option<Exam>, sqlx::Error> {
    let sql = format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = ?");
    sqlx::query_as::<_, Exam>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn exam_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM exams WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn get_exam_with_questions(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<ExamWithQuestions>, sqlx::Error> {
    let Some(exam) = get_exam(conn, id).await? else {
        return Ok(None);
    };
    let questions = questions::questions_for_exam(conn, id).await?;
    Ok(Some(ExamWithQuestions { exam, questions }))
}

/// Unfiltered listing, oldest first.
pub async fn list_exams(
    conn: &mut SqliteConnection,
    skip: i64,
    limit: i64,
) -> Result<Vec<Exam>, sqlx::Error> {
    let sql = format!("SELECT {EXAM_COLUMNS} FROM exams ORDER BY id LIMIT ? OFFSET ?");
    sqlx::query_as::<_, Exam>(&sql)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *conn)
        .await
}

/// Exams matching every supplied field of `filter`, oldest first.
///
/// Id, year and semester constraints run in SQL. The course-name substring
/// test runs in memory because SQLite only case-folds ASCII.
pub async fn search_exams(
    conn: &mut SqliteConnection,
    filter: &ExamFilter,
) -> Result<Vec<Exam>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {EXAM_COLUMNS} FROM exams WHERE 1 = 1"));

    if let Some(university_id) = filter.university_id {
        builder.push(" AND university_id = ").push_bind(university_id);
    }
    if let Some(department_id) = filter.department_id {
        builder.push(" AND department_id = ").push_bind(department_id);
    }
    if let Some(class_level_id) = filter.class_level_id {
        builder.push(" AND class_level_id = ").push_bind(class_level_id);
    }
    if let Some(year) = filter.year {
        builder.push(" AND year = ").push_bind(year);
    }
    if let Some(semester) = &filter.semester {
        builder.push(" AND semester = ").push_bind(semester.clone());
    }
    builder.push(" ORDER BY id");

    let rows: Vec<Exam> = builder.build_query_as().fetch_all(&mut *conn).await?;

    Ok(rows
        .into_iter()
        .filter(|exam| filter.matches_course(exam))
        .collect())
}

/// Pairs each exam with its questions, keeping the exam order.
pub async fn attach_questions(
    conn: &mut SqliteConnection,
    exams: Vec<Exam>,
) -> Result<Vec<ExamWithQuestions>, sqlx::Error> {
    let ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
    let mut grouped = questions::questions_for_exams(conn, &ids).await?;

    Ok(exams
        .into_iter()
        .map(|exam| {
            let questions = grouped.remove(&exam.id).unwrap_or_default();
            ExamWithQuestions { exam, questions }
        })
        .collect())
}

/// Deletes the exam; its questions are removed by the cascade.
pub async fn delete_exam(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
