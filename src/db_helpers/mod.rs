use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod answer_helpers;
mod comment_helpers;
mod question_helpers;
mod stats_helpers;
mod subscription_helpers;
mod user_helpers;

pub use answer_helpers::*;
pub use comment_helpers::*;
pub use question_helpers::*;
pub use stats_helpers::*;
pub use subscription_helpers::*;
pub use user_helpers::*;

const USER_COLUMNS: &str = "id, name, email, password, is_admin, is_premium, created_at";

// ----------------- Helper Functions -----------------

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email.trim().to_lowercase())
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}
