use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::instrument;

use super::{dto::SendSmsRequest, services};
use crate::{auth::extractors::AuthUser, error::AppError, extract::ApiJson, state::AppState};

pub fn sms_routes() -> Router<AppState> {
    Router::new().route("/send_sms", post(send_sms))
}

#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn send_sms(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ApiJson(payload): ApiJson<SendSmsRequest>,
) -> Result<Json<Value>, AppError> {
    let phone_number = payload
        .phone_number
        .filter(|p| !p.trim().is_empty())
        .or(account.phone_number)
        .unwrap_or_default();
    let message = payload.message.unwrap_or_default();

    let receipt = services::send(state.sms.as_ref(), &phone_number, &message).await?;
    Ok(Json(json!({
        "success": "SMS sent successfully",
        "response": receipt.body,
    })))
}
