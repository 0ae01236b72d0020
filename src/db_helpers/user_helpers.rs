use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::RegisterRequest, errors::RequestError, models::User};

use super::USER_COLUMNS;

/// `user.password` must already be hashed.
pub async fn insert_user(
    pool: &SqlitePool,
    user: &RegisterRequest,
    is_admin: bool,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO users (name, email, password, is_admin, is_premium)
        VALUES ($1, $2, $3, $4, 0)
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(is_admin)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn list_users_in_db(pool: &SqlitePool) -> Result<Vec<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id DESC");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn toggle_premium_in_db(pool: &SqlitePool, id: i64) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        UPDATE users SET is_premium = NOT is_premium WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    result.ok_or(RequestError::NotFound("User not found"))
}
