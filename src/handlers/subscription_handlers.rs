use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    authentication::{require_user, MaybeUser},
    data_formats::{CheckoutRequest, CheckoutResponse, WebhookResponse},
    db_helpers::{activate_subscription_in_db, cancel_subscriptions_in_db},
    errors::RequestError,
    payments::{
        create_checkout_session, parse_event, verify_signature, PaymentEvent, Plan,
        SIGNATURE_HEADER,
    },
    AppState,
};

use super::{JsonBody, JsonResult};

// ----------------- Subscription Handlers -----------------
pub async fn create_checkout(
    Extension(state): Extension<Arc<AppState>>,
    maybe_user: MaybeUser,
    JsonBody(request): JsonBody<CheckoutRequest>,
) -> JsonResult<CheckoutResponse> {
    let user = require_user(&state.pool, maybe_user).await?;
    let plan = Plan::from_id(&request.plan_id)
        .ok_or(RequestError::BadRequest("Invalid plan selected"))?;
    let session = create_checkout_session(&state.http, &state.config.stripe, user.id, plan).await?;
    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

fn webhook_error(message: impl std::fmt::Display) -> Response {
    warn!("Webhook rejected: {}", message);
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", message)).into_response()
}

pub async fn payment_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = match headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) {
        Some(signature) => signature,
        None => return webhook_error("missing signature header"),
    };
    if let Err(e) = verify_signature(
        state.config.stripe.webhook_secret.as_deref(),
        signature,
        &body,
        Utc::now().timestamp(),
    ) {
        return webhook_error(e);
    }

    let event = match parse_event(&body) {
        Ok(event) => event,
        Err(e) => return webhook_error(e),
    };

    let result = match event {
        PaymentEvent::CheckoutCompleted {
            user_id,
            plan,
            subscription_id,
        } => activate_subscription_in_db(
            &state.pool,
            user_id,
            plan,
            subscription_id.as_deref(),
            Utc::now(),
        )
        .await
        .map(|subscription| {
            info!(
                user_id,
                subscription_id = subscription.id,
                plan = %subscription.plan_type,
                status = %subscription.status,
                start_date = %subscription.start_date,
                end_date = %subscription.end_date,
                "Activated premium subscription"
            );
        }),
        PaymentEvent::SubscriptionDeleted { user_id } => {
            cancel_subscriptions_in_db(&state.pool, user_id)
                .await
                .map(|cancelled| info!(user_id, cancelled, "Cancelled premium subscription"))
        }
        PaymentEvent::Ignored(kind) => {
            info!(kind = %kind, "Ignoring payment event");
            Ok(())
        }
    };

    match result {
        Ok(()) => Json(WebhookResponse { received: true }).into_response(),
        Err(RequestError::NotFound(message)) => webhook_error(message),
        Err(e) => {
            error!("Webhook processing failed");
            e.into_response()
        }
    }
}
