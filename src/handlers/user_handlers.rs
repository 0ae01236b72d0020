use std::sync::Arc;

use axum::{Extension, Json};
use tracing::{error, info};

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    data_formats::{AuthWrapper, LoginRequest, RegisterRequest, UserResponse},
    db_helpers::{get_user_by_email, get_user_by_id, insert_user},
    errors::{is_unique_violation, RequestError},
    models::User,
    AppState,
};

use super::{JsonBody, JsonResult};

fn auth_response(state: &AppState, user: User) -> JsonResult<AuthWrapper> {
    let token = get_jwt_token(&state.config, user.id).map_err(|e| {
        error!("Could not generate JWT: {:#}", e);
        RequestError::ServerError
    })?;
    Ok(Json(AuthWrapper::wrap_with_user_data(user.into(), token)))
}

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> JsonResult<AuthWrapper> {
    let mut user = request.validate()?;
    let is_admin = state.config.is_admin_email(&user.email);
    user.password = hash_password_argon2(user.password).await.map_err(|e| {
        error!("Could not hash password: {:#}", e);
        RequestError::ServerError
    })?;

    let user = insert_user(&state.pool, &user, is_admin)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RequestError::BadRequest("User already exists");
            }
            e
        })?;
    info!(user_id = user.id, is_admin, "Registered user");
    auth_response(&state, user)
}

pub async fn login_user(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> JsonResult<AuthWrapper> {
    let user = match get_user_by_email(&state.pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::NotAuthorized("Invalid credentials")),
    };
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|e| {
            error!("Could not verify password: {:#}", e);
            RequestError::ServerError
        })?;

    if !is_password_correct {
        return Err(RequestError::NotAuthorized("Invalid credentials"));
    }
    auth_response(&state, user)
}

pub async fn get_current_user(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
) -> JsonResult<UserResponse> {
    let AuthUser { id, .. } = maybe_user.required()?;
    let user = get_user_by_id(&state.pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(user.into()))
}
