use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::QuestionStatsWrapper,
    errors::RequestError,
    models::{OptionCount, Question, SliceCount},
    stats::{tally_options, tally_slices, total_answers, OptionStat, SliceDimension, SliceStat},
};

pub async fn compute_stats_in_db(
    pool: &SqlitePool,
    question_id: i64,
    option_count: usize,
) -> Result<Vec<OptionStat>, RequestError> {
    let mut tx = pool.begin().await?;
    let grouped = sqlx::query_as::<Sqlite, OptionCount>(
        r#"
        SELECT option_index, COUNT(*) AS count
        FROM answers
        WHERE question_id = $1
        GROUP BY option_index
        ORDER BY option_index
        "#,
    )
    .bind(question_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(tally_options(option_count, &grouped))
}

pub async fn compute_slice_in_db(
    pool: &SqlitePool,
    question_id: i64,
    dimension: SliceDimension,
    total: i64,
) -> Result<Vec<SliceStat>, RequestError> {
    let mut tx = pool.begin().await?;
    let column = dimension.column();
    let query = format!(
        r#"
        SELECT {column} AS value, option_index, COUNT(*) AS count
        FROM answers
        WHERE question_id = $1
        GROUP BY {column}, option_index
        ORDER BY {column}, option_index
        "#
    );
    let grouped = sqlx::query_as::<Sqlite, SliceCount>(&query)
        .bind(question_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(tally_slices(total, grouped))
}

pub async fn question_stats_in_db(
    pool: &SqlitePool,
    question: &Question,
) -> Result<QuestionStatsWrapper, RequestError> {
    let overall = compute_stats_in_db(pool, question.id, question.option_count()).await?;
    let total = total_answers(&overall);

    let by_education =
        compute_slice_in_db(pool, question.id, SliceDimension::Education, total).await?;
    let by_age_range =
        compute_slice_in_db(pool, question.id, SliceDimension::AgeRange, total).await?;
    let by_region = compute_slice_in_db(pool, question.id, SliceDimension::Region, total).await?;

    Ok(QuestionStatsWrapper {
        total_answers: total,
        overall,
        by_education,
        by_age_range,
        by_region,
    })
}
