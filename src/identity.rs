use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{authentication::MaybeUser, errors::RequestError};

pub const DEVICE_ID_HEADER: &str = "X-Device-ID";
const MAX_DEVICE_ID_LEN: usize = 256;

/// Who is voting. Stored as `(kind, key)` and unique per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(i64),
    Device(String),
}

impl Identity {
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::User(_) => "user",
            Identity::Device(_) => "device",
        }
    }

    pub fn key(&self) -> String {
        match self {
            Identity::User(id) => id.to_string(),
            Identity::Device(device) => device.clone(),
        }
    }
}

/// A logged-in user always votes as themselves, whatever device they use.
/// Anonymous callers are keyed by their device fingerprint.
pub fn resolve_identity(
    user_id: Option<i64>,
    device_id: Option<&str>,
) -> Result<Identity, RequestError> {
    if let Some(id) = user_id {
        return Ok(Identity::User(id));
    }
    match device_id.map(str::trim) {
        Some(device) if device.len() > MAX_DEVICE_ID_LEN => {
            Err(RequestError::BadRequest("Device ID is too long"))
        }
        Some(device) if !device.is_empty() => Ok(Identity::Device(device.to_string())),
        _ => Err(RequestError::BadRequest(
            "Device ID or user identity required",
        )),
    }
}

pub struct Voter(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Voter
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let maybe_user = MaybeUser::from_request_parts(parts, state).await?;
        let device_id = parts
            .headers
            .get(DEVICE_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        resolve_identity(maybe_user.get_id(), device_id).map(Voter)
    }
}
