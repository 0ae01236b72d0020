use std::sync::Arc;

use crate::{config::Config, errors::RequestError, models::User, AppState};
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

pub struct AuthUser {
    pub id: i64,
}

/// The caller's bearer token, if one was sent. A token that is present but
/// invalid rejects the request instead of falling back to anonymous.
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|a| a.id)
    }

    pub fn required(self) -> Result<AuthUser, RequestError> {
        self.0
            .ok_or(RequestError::NotAuthorized("Authentication token required"))
    }
}

fn app_state(parts: &Parts) -> Result<Arc<AppState>, RequestError> {
    parts
        .extensions
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(RequestError::ServerError)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => {
                debug!("Authorization header is not valid UTF-8");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let token = match header.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => {
                debug!("Authorization header without Bearer prefix");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let state = app_state(parts)?;
        let id = verify_jwt_token(&state.config, token)?;

        Ok(MaybeUser(Some(AuthUser { id })))
    }
}

pub fn get_jwt_token(config: &Config, id: i64) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + time::Duration::days(config.jwt_expiry_days);
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(config: &Config, token: &str) -> Result<i64, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        debug!("Error verifying token: {}", e);
        RequestError::NotAuthorized("Invalid or expired token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Invalid or expired token"));
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

// ----------------- Role Checks -----------------

async fn load_caller(pool: &SqlitePool, user: AuthUser) -> Result<User, RequestError> {
    crate::db_helpers::get_user_by_id(pool, user.id)
        .await?
        .ok_or(RequestError::NotAuthorized("User no longer exists"))
}

pub async fn require_admin(pool: &SqlitePool, maybe_user: MaybeUser) -> Result<User, RequestError> {
    let user = load_caller(pool, maybe_user.required()?).await?;
    if !user.is_admin {
        return Err(RequestError::Forbidden("Admin access required"));
    }
    Ok(user)
}

/// Admins are allowed through as well.
pub async fn require_premium(
    pool: &SqlitePool,
    maybe_user: MaybeUser,
) -> Result<User, RequestError> {
    let user = load_caller(pool, maybe_user.required()?).await?;
    if !user.is_premium && !user.is_admin {
        return Err(RequestError::Forbidden("Premium subscription required"));
    }
    Ok(user)
}

pub async fn require_user(pool: &SqlitePool, maybe_user: MaybeUser) -> Result<User, RequestError> {
    load_caller(pool, maybe_user.required()?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StripeConfig;

    fn config(secret: &str) -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            bind_address: "127.0.0.1:0".parse().unwrap(),
            jwt_secret: secret.into(),
            jwt_expiry_days: 1,
            admin_emails: vec![],
            stripe: StripeConfig::default(),
        }
    }

    #[test]
    fn issued_token_verifies_to_same_id() {
        let config = config("test-secret");
        let token = get_jwt_token(&config, 42).unwrap();
        assert_eq!(verify_jwt_token(&config, &token).unwrap(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = get_jwt_token(&config("one"), 42).unwrap();
        assert!(matches!(
            verify_jwt_token(&config("two"), &token),
            Err(RequestError::NotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password_argon2("hunter22".into()).await.unwrap();
        assert!(verify_password_argon2("hunter22".into(), &hash).await.unwrap());
        assert!(!verify_password_argon2("hunter23".into(), &hash).await.unwrap());
    }
}
