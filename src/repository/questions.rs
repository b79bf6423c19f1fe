// src/repository/questions.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, types::Json};

use crate::models::question::{CreateQuestionRequest, Question};

/// Inserts `questions` for `exam_id`, returning the stored rows in the order
/// they were submitted.
///
/// Rows are written one by one; run this inside a transaction so that a
/// failure part-way through leaves nothing behind.
pub async fn insert_questions(
    conn: &mut SqliteConnection,
    exam_id: i64,
    questions: &[CreateQuestionRequest],
) -> Result<Vec<Question>, sqlx::Error> {
    let mut created = Vec::with_capacity(questions.len());

    for question in questions {
        let row = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (exam_id, question_text, answer, options)
            VALUES (?, ?, ?, ?)
            RETURNING id, exam_id, question_text, answer, options
            "#,
        )
        .bind(exam_id)
        .bind(&question.question_text)
        .bind(&question.answer)
        .bind(question.options.clone().map(Json))
        .fetch_one(&mut *conn)
        .await?;

        created.push(row);
    }

    Ok(created)
}

pub async fn questions_for_exam(
    conn: &mut SqliteConnection,
    exam_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, exam_id, question_text, answer, options
        FROM questions
        WHERE exam_id = ?
        ORDER BY id
        "#,
    )
    .bind(exam_id)
    .fetch_all(&mut *conn)
    .await
}

/// Exam ids bound per `IN (...)` query. SQLite caps bound variables at 32766.
const IDS_PER_QUERY: usize = 500;

/// Questions of several exams, grouped by exam id, each group in insertion
/// order. Ids are fetched in chunks so any number of exams can be passed.
pub async fn questions_for_exams(
    conn: &mut SqliteConnection,
    exam_ids: &[i64],
) -> Result<HashMap<i64, Vec<Question>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<Question>> = HashMap::new();

    for chunk in exam_ids.chunks(IDS_PER_QUERY) {
        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, exam_id, question_text, answer, options FROM questions WHERE exam_id IN (",
        );

        let mut separated = query_builder.separated(",");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<Question> = query_builder
            .build_query_as()
            .fetch_all(&mut *conn)
            .await?;

        for question in rows {
            grouped.entry(question.exam_id).or_default().push(question);
        }
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, repository::users, utils::hash::hash_password};

    async fn exam_fixture(conn: &mut SqliteConnection) -> i64 {
        let hashed = hash_password("pw123456").unwrap();
        let user = users::create_user(conn, "owner", "owner@example.com", &hashed)
            .await
            .unwrap();
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO exams (title, course_name, year, semester, user_id) VALUES ('Final', 'Physics', 2023, 'Fall', ?) RETURNING id",
        )
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await
        .unwrap()
    }

    fn q(text: &str, options: Option<Vec<&str>>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: text.to_string(),
            answer: "A".to_string(),
            options: options.map(|o| o.into_iter().map(String::from).collect()),
        }
    }

    #[tokio::test]
    async fn bulk_insert_preserves_submission_order() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let exam_id = exam_fixture(&mut conn).await;

        let input = vec![
            q("first", Some(vec!["A", "B"])),
            q("second", None),
            q("third", Some(vec!["A", "B", "C"])),
        ];
        let created = insert_questions(&mut conn, exam_id, &input).await.unwrap();

        let texts: Vec<_> = created.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert!(created.windows(2).all(|w| w[0].id < w[1].id));
        assert!(created.iter().all(|q| q.exam_id == exam_id));
        assert!(created[1].options.is_none());
        assert_eq!(created[2].options.as_ref().unwrap().0.len(), 3);

        let stored = questions_for_exam(&mut conn, exam_id).await.unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn failed_batch_in_transaction_persists_nothing() {
        let pool = test_pool().await;
        let exam_id = {
            let mut conn = pool.acquire().await.unwrap();
            exam_fixture(&mut conn).await
        };

        let mut tx = pool.begin().await.unwrap();
        insert_questions(&mut tx, exam_id, &[q("ok", None)]).await.unwrap();
        // Unknown exam id violates the foreign key.
        let err = insert_questions(&mut tx, exam_id + 100, &[q("orphan", None)])
            .await
            .unwrap_err();
        assert!(err.as_database_error().unwrap().is_foreign_key_violation());
        tx.rollback().await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(questions_for_exam(&mut conn, exam_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn grouped_fetch_handles_empty_input() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(questions_for_exams(&mut conn, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_fetch_handles_more_ids_than_sqlite_can_bind() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let exam_id = exam_fixture(&mut conn).await;
        insert_questions(&mut conn, exam_id, &[q("only", None)]).await.unwrap();

        let mut ids: Vec<i64> = (1_000..41_000).collect();
        ids.push(exam_id);

        let grouped = questions_for_exams(&mut conn, &ids).await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[&exam_id][0].question_text, "only");
    }
}
