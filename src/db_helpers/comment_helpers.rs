use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

use super::get_question_by_id;

const COMMENT_QUERY: &str = r#"
            SELECT comments.id                                           AS "id",
                   comments.question_id                                  AS "question_id",
                   comments.user_id                                      AS "user_id",
                   comments.content                                      AS "content",
                   comments.created_at                                   AS "created_at",
                   users.name                                            AS "author_name",
                   (SELECT COUNT(*)
                    FROM   likes
                    WHERE  likes.comment_id = comments.id)               AS "like_count",
                   EXISTS (SELECT 1
                           FROM   likes
                           WHERE  likes.comment_id = comments.id
                                  AND likes.user_id = $1)                AS "is_liked"
            FROM   comments
                   JOIN users
                     ON users.id = comments.user_id
"#;

pub async fn add_comment_to_question_in_db(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
    content: &str,
) -> Result<Comment, RequestError> {
    match get_question_by_id(pool, question_id).await? {
        Some(question) if !question.is_archived() => {}
        _ => return Err(RequestError::NotFound("Question not found")),
    }

    let mut tx = pool.begin().await?;
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO comments (question_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(question_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(&mut tx)
    .await?;

    let query = format!("{COMMENT_QUERY} WHERE comments.id = $2");
    let comment = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(user_id)
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(comment)
}

/// Newest first. `viewer` decides `is_liked`; anonymous viewers like nothing.
pub async fn get_comments_for_question_in_db(
    pool: &SqlitePool,
    question_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{COMMENT_QUERY} WHERE comments.question_id = $2 ORDER BY comments.id DESC");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(viewer)
        .bind(question_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Flips the caller's like on a comment and reports whether it is now liked.
///
/// Both statements write, so the transaction takes the write lock up front and
/// concurrent toggles on the same pair run one after another. The insert is a
/// no-op when the pair already exists, in which case the like is removed. When
/// neither statement touches a row the comment does not exist.
pub async fn toggle_like_in_db(
    pool: &SqlitePool,
    user_id: i64,
    comment_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let inserted = sqlx::query(
        r#"
        INSERT INTO likes (comment_id, user_id)
        SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM comments WHERE id = $1)
        ON CONFLICT (comment_id, user_id) DO NOTHING
        "#,
    )
    .bind(comment_id)
    .bind(user_id)
    .execute(&mut tx)
    .await?
    .rows_affected();

    if inserted == 1 {
        tx.commit().await?;
        return Ok(true);
    }

    let deleted = sqlx::query("DELETE FROM likes WHERE comment_id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    if deleted == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(false)
}
