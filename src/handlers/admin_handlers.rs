use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    authentication::{require_admin, MaybeUser},
    data_formats::{
        AdminCreateQuestionRequest, AdminQuestionResponse, MessageResponse, QuestionDraft,
        QuestionResponse, UpdateQuestionRequest, UserResponse,
    },
    db_helpers::{
        archive_question_in_db, insert_question_in_db, list_admin_questions_in_db,
        list_users_in_db, toggle_premium_in_db, update_question_in_db,
    },
    AppState,
};

use super::{CreatedResult, JsonBody, JsonResult};

// ----------------- Admin Question Handlers -----------------
pub async fn admin_list_questions(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
) -> JsonResult<Vec<AdminQuestionResponse>> {
    require_admin(&state.pool, maybe_user).await?;
    let questions = list_admin_questions_in_db(&state.pool).await?;
    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

pub async fn admin_create_question(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    JsonBody(request): JsonBody<AdminCreateQuestionRequest>,
) -> CreatedResult<QuestionResponse> {
    let admin = require_admin(&state.pool, maybe_user).await?;
    let draft = QuestionDraft::new(
        &request.title,
        &request.content,
        &request.options,
        request.start_date,
        request.end_date,
    )?;
    let question = insert_question_in_db(&state.pool, admin.id, admin.is_premium, draft).await?;
    info!(question_id = question.id, "Admin created question");
    Ok((StatusCode::CREATED, Json(QuestionResponse::new(question, None))))
}

pub async fn admin_update_question(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(question_id): Path<i64>,
    JsonBody(request): JsonBody<UpdateQuestionRequest>,
) -> JsonResult<QuestionResponse> {
    require_admin(&state.pool, maybe_user).await?;
    let question = update_question_in_db(&state.pool, question_id, request).await?;
    info!(question_id, is_active = question.is_active, "Admin updated question");
    Ok(Json(QuestionResponse::new(question, None)))
}

pub async fn admin_delete_question(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(question_id): Path<i64>,
) -> JsonResult<MessageResponse> {
    require_admin(&state.pool, maybe_user).await?;
    archive_question_in_db(&state.pool, question_id, Utc::now()).await?;
    info!(question_id, "Admin archived question");
    Ok(Json(MessageResponse::new("Question deleted successfully")))
}

// ----------------- Admin User Handlers -----------------
pub async fn admin_list_users(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
) -> JsonResult<Vec<UserResponse>> {
    require_admin(&state.pool, maybe_user).await?;
    let users = list_users_in_db(&state.pool).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

pub async fn admin_toggle_premium(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(user_id): Path<i64>,
) -> JsonResult<UserResponse> {
    require_admin(&state.pool, maybe_user).await?;
    let user = toggle_premium_in_db(&state.pool, user_id).await?;
    info!(user_id, is_premium = user.is_premium, "Admin toggled premium");
    Ok(Json(user.into()))
}
