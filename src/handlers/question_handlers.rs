use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    authentication::{require_premium, MaybeUser},
    data_formats::{CreateQuestionRequest, QuestionDraft, QuestionResponse, QuestionStatsWrapper},
    db_helpers::{
        count_answers_in_db, get_active_question_in_db, get_question_by_id, insert_question_in_db,
        question_stats_in_db,
    },
    errors::RequestError,
    AppState,
};

use super::{CreatedResult, JsonBody, JsonResult};

// ----------------- Question Handlers -----------------
pub async fn get_daily_question(
    Extension(state): Extension<Arc<AppState>>,
) -> JsonResult<QuestionResponse> {
    let question = get_active_question_in_db(&state.pool, Utc::now()).await?;
    let answer_count = count_answers_in_db(&state.pool, question.id).await?;
    Ok(Json(QuestionResponse::new(question, Some(answer_count))))
}

pub async fn create_question(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    JsonBody(request): JsonBody<CreateQuestionRequest>,
) -> CreatedResult<QuestionResponse> {
    let author = require_premium(&state.pool, maybe_user).await?;
    let draft = QuestionDraft::new(
        &request.title,
        &request.content,
        &request.options,
        None,
        None,
    )?;
    let question = insert_question_in_db(&state.pool, author.id, author.is_premium, draft).await?;
    info!(question_id = question.id, author_id = author.id, "Created question");
    Ok((StatusCode::CREATED, Json(QuestionResponse::new(question, None))))
}

pub async fn get_question_stats(
    Extension(state): Extension<Arc<AppState>>,
    Path(question_id): Path<i64>,
) -> JsonResult<QuestionStatsWrapper> {
    let question = get_question_by_id(&state.pool, question_id)
        .await?
        .ok_or(RequestError::NotFound("Question not found"))?;
    Ok(Json(question_stats_in_db(&state.pool, &question).await?))
}
