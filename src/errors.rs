use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, error};

use crate::{stats::OptionStat, JsonResponse};

#[derive(Debug)]
pub enum RequestError {
    BadRequest(&'static str),
    InvalidBody(String),
    NotFound(&'static str),
    NotAuthorized(&'static str),
    Forbidden(&'static str),
    Duplicate {
        message: &'static str,
        stats: Vec<OptionStat>,
    },
    PaymentError(String),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(Debug, serde::Serialize)]
pub struct RequestErrorJson {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Vec<OptionStat>>,
}

impl RequestErrorJson {
    pub fn new(message: &str) -> RequestErrorJson {
        RequestErrorJson {
            message: message.to_string(),
            stats: None,
        }
    }

    pub fn with_stats(message: &str, stats: Vec<OptionStat>) -> RequestErrorJson {
        RequestErrorJson {
            message: message.to_string(),
            stats: Some(stats),
        }
    }
}

impl From<JsonRejection> for RequestError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(self) -> JsonResponse<RequestErrorJson> {
        let (status_code, json) = match self {
            RequestError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, RequestErrorJson::new(message))
            }
            RequestError::InvalidBody(message) => {
                (StatusCode::BAD_REQUEST, RequestErrorJson::new(&message))
            }
            RequestError::NotFound(message) => {
                (StatusCode::NOT_FOUND, RequestErrorJson::new(message))
            }
            RequestError::NotAuthorized(message) => {
                (StatusCode::UNAUTHORIZED, RequestErrorJson::new(message))
            }
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, RequestErrorJson::new(message))
            }
            RequestError::Duplicate { message, stats } => (
                StatusCode::CONFLICT,
                RequestErrorJson::with_stats(message, stats),
            ),
            RequestError::PaymentError(e) => {
                error!("Payment provider error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    RequestErrorJson::new("Payment provider unavailable"),
                )
            }
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJson::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJson::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }
}

/// True when the error is SQLite rejecting a row that breaks a UNIQUE index.
pub fn is_unique_violation(error: &RequestError) -> bool {
    match error {
        RequestError::DatabaseError(sqlx::Error::Database(e)) => {
            e.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}
