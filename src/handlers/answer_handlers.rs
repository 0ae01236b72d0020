use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    data_formats::{CheckAnswerWrapper, Demographics, SubmitAnswerRequest, SubmitAnswerWrapper},
    db_helpers::{compute_stats_in_db, get_question_by_id, has_answered_in_db, submit_answer_in_db},
    errors::RequestError,
    identity::Voter,
    AppState,
};

use super::{CreatedResult, JsonBody, JsonResult};

// ----------------- Answer Handlers -----------------
pub async fn check_answer(
    Extension(state): Extension<Arc<AppState>>,
    Path(question_id): Path<i64>,
    Voter(identity): Voter,
) -> JsonResult<CheckAnswerWrapper> {
    let question = get_question_by_id(&state.pool, question_id)
        .await?
        .ok_or(RequestError::NotFound("Question not found"))?;

    if !has_answered_in_db(&state.pool, question_id, &identity).await? {
        return Ok(Json(CheckAnswerWrapper {
            has_answered: false,
            stats: None,
        }));
    }
    let stats = compute_stats_in_db(&state.pool, question_id, question.option_count()).await?;
    Ok(Json(CheckAnswerWrapper {
        has_answered: true,
        stats: Some(stats),
    }))
}

pub async fn submit_answer(
    Extension(state): Extension<Arc<AppState>>,
    Voter(identity): Voter,
    JsonBody(request): JsonBody<SubmitAnswerRequest>,
) -> CreatedResult<SubmitAnswerWrapper> {
    let demographics = Demographics::new(request.education, request.age_range, request.region)?;
    let (answer, stats) = submit_answer_in_db(
        &state.pool,
        request.question_id,
        &identity,
        request.option_index,
        demographics,
        Utc::now(),
    )
    .await?;
    info!(
        question_id = answer.question_id,
        kind = identity.kind(),
        "Recorded answer"
    );
    Ok((
        StatusCode::CREATED,
        Json(SubmitAnswerWrapper {
            answer: answer.into(),
            stats,
        }),
    ))
}
