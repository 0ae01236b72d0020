use chrono::{DateTime, Utc};
use sqlx::{types::Json, Sqlite, SqlitePool};

use crate::{
    data_formats::{validate_options, validate_window, QuestionDraft, UpdateQuestionRequest},
    errors::RequestError,
    models::{AdminQuestion, Question},
};

pub(crate) const QUESTION_COLUMNS: &str = "questions.id AS id, questions.title AS title, \
     questions.content AS content, questions.options AS options, questions.is_active AS is_active, \
     questions.start_date AS start_date, questions.end_date AS end_date, \
     questions.author_id AS author_id, questions.is_premium AS is_premium, \
     questions.archived_at AS archived_at, questions.created_at AS created_at";

pub async fn get_question_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Question>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Question>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// The active, non-archived question whose window contains `now`. When
/// several qualify the most recently created one wins.
pub async fn get_active_question_in_db(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<Question, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        SELECT {QUESTION_COLUMNS} FROM questions
        WHERE is_active = 1
            AND archived_at IS NULL
            AND start_date IS NOT NULL
            AND end_date IS NOT NULL
            AND julianday(start_date) <= julianday($1)
            AND julianday(end_date) >= julianday($1)
        ORDER BY id DESC
        LIMIT 1
        "#
    );
    let result = sqlx::query_as::<Sqlite, Question>(&query)
        .bind(now)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    result.ok_or(RequestError::NotFound("No daily question available"))
}

pub async fn count_answers_in_db(pool: &SqlitePool, question_id: i64) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM answers WHERE question_id = $1")
        .bind(question_id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(count)
}

pub async fn insert_question_in_db(
    pool: &SqlitePool,
    author_id: i64,
    is_premium: bool,
    QuestionDraft {
        title,
        content,
        options,
        start_date,
        end_date,
    }: QuestionDraft,
) -> Result<Question, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO questions (title, content, options, is_active, start_date, end_date, author_id, is_premium)
        VALUES ($1, $2, $3, 0, $4, $5, $6, $7)
        RETURNING {}
        "#,
        QUESTION_COLUMNS.replace("questions.", "")
    );
    let question = sqlx::query_as::<Sqlite, Question>(&query)
        .bind(title)
        .bind(content)
        .bind(Json(options))
        .bind(start_date)
        .bind(end_date)
        .bind(author_id)
        .bind(is_premium)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(question)
}

pub async fn list_admin_questions_in_db(
    pool: &SqlitePool,
) -> Result<Vec<AdminQuestion>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        SELECT {QUESTION_COLUMNS},
            users.name AS author_name,
            users.email AS author_email,
            (SELECT COUNT(*) FROM answers WHERE answers.question_id = questions.id) AS answer_count,
            (SELECT COUNT(*) FROM comments WHERE comments.question_id = questions.id) AS comment_count
        FROM questions
            JOIN users ON users.id = questions.author_id
        WHERE questions.archived_at IS NULL
        ORDER BY questions.id DESC
        "#
    );
    let result = sqlx::query_as::<Sqlite, AdminQuestion>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Fields left out of the request keep their stored value; an explicit `null`
/// date clears that bound.
pub async fn update_question_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateQuestionRequest {
        title,
        content,
        options,
        start_date,
        end_date,
        is_active,
    }: UpdateQuestionRequest,
) -> Result<Question, RequestError> {
    let current = match get_question_by_id(pool, id).await? {
        Some(question) if !question.is_archived() => question,
        _ => return Err(RequestError::NotFound("Question not found")),
    };

    let title = match title {
        Some(title) if title.trim().is_empty() => {
            return Err(RequestError::BadRequest("Title cannot be empty"))
        }
        Some(title) => title.trim().to_string(),
        None => current.title,
    };
    let content = match content {
        Some(content) if content.trim().is_empty() => {
            return Err(RequestError::BadRequest("Content cannot be empty"))
        }
        Some(content) => content.trim().to_string(),
        None => current.content,
    };
    let options = match options {
        Some(options) => validate_options(&options)?,
        None => current.options.0,
    };
    let start_date = start_date.unwrap_or(current.start_date);
    let end_date = end_date.unwrap_or(current.end_date);
    validate_window(start_date, end_date)?;
    let is_active = is_active.unwrap_or(current.is_active);

    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        UPDATE questions
        SET title = $1, content = $2, options = $3, start_date = $4, end_date = $5, is_active = $6
        WHERE id = $7
        RETURNING {}
        "#,
        QUESTION_COLUMNS.replace("questions.", "")
    );
    let question = sqlx::query_as::<Sqlite, Question>(&query)
        .bind(title)
        .bind(content)
        .bind(Json(options))
        .bind(start_date)
        .bind(end_date)
        .bind(is_active)
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(question)
}

/// Soft delete. Answers stay in place so historical statistics still work.
pub async fn archive_question_in_db(
    pool: &SqlitePool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE questions SET archived_at = $1, is_active = 0
        WHERE id = $2 AND archived_at IS NULL
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Question not found"));
    }
    Ok(())
}
