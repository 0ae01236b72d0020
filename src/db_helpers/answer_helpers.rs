use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::{
    data_formats::Demographics,
    errors::{is_unique_violation, RequestError},
    identity::Identity,
    models::Answer,
    stats::OptionStat,
};

use super::{compute_stats_in_db, get_question_by_id};

const ANSWER_COLUMNS: &str = "id, question_id, option_index, \
     education, age_range, region, created_at";

pub const DUPLICATE_ANSWER_MESSAGE: &str = "You have already answered this question";

/// Records one vote and returns it together with the updated tallies.
///
/// There is no prior existence check: the `(question_id, identity_kind,
/// identity_key)` unique index rejects a second vote, and that rejection is
/// reported as `Duplicate` with the current tallies.
pub async fn submit_answer_in_db(
    pool: &SqlitePool,
    question_id: i64,
    identity: &Identity,
    option_index: i64,
    demographics: Demographics,
    now: DateTime<Utc>,
) -> Result<(Answer, Vec<OptionStat>), RequestError> {
    let question = match get_question_by_id(pool, question_id).await? {
        Some(question) if question.accepts_answers_at(now) => question,
        _ => return Err(RequestError::NotFound("Question not found or not active")),
    };
    if option_index < 0 || option_index as usize >= question.option_count() {
        return Err(RequestError::BadRequest("Selected option does not exist"));
    }

    let inserted = insert_answer(pool, question_id, identity, option_index, demographics).await;
    let answer = match inserted {
        Ok(answer) => answer,
        Err(e) if is_unique_violation(&e) => {
            info!(
                question_id,
                kind = identity.kind(),
                "Rejected duplicate answer"
            );
            let stats = compute_stats_in_db(pool, question_id, question.option_count()).await?;
            return Err(RequestError::Duplicate {
                message: DUPLICATE_ANSWER_MESSAGE,
                stats,
            });
        }
        Err(e) => return Err(e),
    };

    let stats = compute_stats_in_db(pool, question_id, question.option_count()).await?;
    Ok((answer, stats))
}

async fn insert_answer(
    pool: &SqlitePool,
    question_id: i64,
    identity: &Identity,
    option_index: i64,
    Demographics {
        education,
        age_range,
        region,
    }: Demographics,
) -> Result<Answer, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO answers (question_id, identity_kind, identity_key, option_index, education, age_range, region)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ANSWER_COLUMNS}
        "#
    );
    let answer = sqlx::query_as::<Sqlite, Answer>(&query)
        .bind(question_id)
        .bind(identity.kind())
        .bind(identity.key())
        .bind(option_index)
        .bind(education)
        .bind(age_range)
        .bind(region)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(answer)
}

pub async fn has_answered_in_db(
    pool: &SqlitePool,
    question_id: i64,
    identity: &Identity,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let (answered,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM answers
            WHERE question_id = $1 AND identity_kind = $2 AND identity_key = $3
        )
        "#,
    )
    .bind(question_id)
    .bind(identity.kind())
    .bind(identity.key())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(answered)
}
