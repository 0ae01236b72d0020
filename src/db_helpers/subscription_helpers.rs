use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Subscription, payments::Plan};

/// Marks the user premium and records the subscription in one transaction.
pub async fn activate_subscription_in_db(
    pool: &SqlitePool,
    user_id: i64,
    plan: Plan,
    provider_subscription_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Subscription, RequestError> {
    let mut tx = pool.begin().await?;
    let updated = sqlx::query("UPDATE users SET is_premium = 1 WHERE id = $1")
        .bind(user_id)
        .execute(&mut tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }

    let subscription = sqlx::query_as::<Sqlite, Subscription>(
        r#"
        INSERT INTO subscriptions (user_id, plan_type, status, provider_subscription_id, start_date, end_date)
        VALUES ($1, $2, 'active', $3, $4, $5)
        RETURNING id, plan_type, status, start_date, end_date
        "#,
    )
    .bind(user_id)
    .bind(plan.as_str())
    .bind(provider_subscription_id)
    .bind(now)
    .bind(now + plan.duration())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(subscription)
}

/// Clears the premium flag and cancels every active subscription of the user.
/// Returns how many subscriptions were cancelled.
pub async fn cancel_subscriptions_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<u64, RequestError> {
    let mut tx = pool.begin().await?;
    let updated = sqlx::query("UPDATE users SET is_premium = 0 WHERE id = $1")
        .bind(user_id)
        .execute(&mut tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    let cancelled = sqlx::query(
        "UPDATE subscriptions SET status = 'cancelled' WHERE user_id = $1 AND status = 'active'",
    )
    .bind(user_id)
    .execute(&mut tx)
    .await?
    .rows_affected();
    tx.commit().await?;
    Ok(cancelled)
}
