use axum::{
    extract::FromRequest,
    http::{StatusCode, Uri},
    Json,
};

use crate::errors::RequestError;

mod admin_handlers;
mod answer_handlers;
mod comment_handlers;
mod question_handlers;
mod subscription_handlers;
mod user_handlers;

pub use admin_handlers::*;
pub use answer_handlers::*;
pub use comment_handlers::*;
pub use question_handlers::*;
pub use subscription_handlers::*;
pub use user_handlers::*;

/// `axum::Json` whose rejections come back as a 400 `{"message": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RequestError))]
pub struct JsonBody<T>(pub T);

type JsonResult<T> = Result<Json<T>, RequestError>;
type CreatedResult<T> = Result<(StatusCode, Json<T>), RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    )
}
