use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::{require_user, MaybeUser},
    data_formats::{
        validate_comment, CommentRequest, CommentResponse, LikeResponse, NewCommentRequest,
    },
    db_helpers::{
        add_comment_to_question_in_db, get_comments_for_question_in_db, get_question_by_id,
        toggle_like_in_db,
    },
    errors::RequestError,
    AppState,
};

use super::{CreatedResult, JsonBody, JsonResult};

// ----------------- Comment Handlers -----------------
pub async fn get_question_comments(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(question_id): Path<i64>,
) -> JsonResult<Vec<CommentResponse>> {
    get_question_by_id(&state.pool, question_id)
        .await?
        .ok_or(RequestError::NotFound("Question not found"))?;
    let comments =
        get_comments_for_question_in_db(&state.pool, question_id, maybe_user.get_id()).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

async fn add_comment(
    state: &AppState,
    maybe_user: MaybeUser,
    question_id: i64,
    content: &str,
) -> CreatedResult<CommentResponse> {
    let user = require_user(&state.pool, maybe_user).await?;
    let content = validate_comment(content)?;
    let comment = add_comment_to_question_in_db(&state.pool, user.id, question_id, &content).await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

pub async fn add_question_comment(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(question_id): Path<i64>,
    JsonBody(CommentRequest { content }): JsonBody<CommentRequest>,
) -> CreatedResult<CommentResponse> {
    add_comment(&state, maybe_user, question_id, &content).await
}

pub async fn create_comment(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    JsonBody(NewCommentRequest {
        question_id,
        content,
    }): JsonBody<NewCommentRequest>,
) -> CreatedResult<CommentResponse> {
    add_comment(&state, maybe_user, question_id, &content).await
}

pub async fn toggle_comment_like(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    Path(comment_id): Path<i64>,
) -> JsonResult<LikeResponse> {
    let user = require_user(&state.pool, maybe_user).await?;
    let liked = toggle_like_in_db(&state.pool, user.id, comment_id).await?;
    let message = if liked {
        "Comment liked"
    } else {
        "Comment unliked"
    };
    Ok(Json(LikeResponse {
        liked,
        message: message.to_string(),
    }))
}
