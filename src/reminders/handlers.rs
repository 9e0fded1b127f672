use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateReminderRequest, ReminderResponse, UpdateReminderRequest},
    services,
};
use crate::{auth::extractors::AuthUser, error::AppError, extract::{ApiJson, ApiPath}, state::AppState};

pub fn reminder_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(add_reminder))
        .route("/reminders/:id", put(update_reminder).delete(delete_reminder))
}

#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn add_reminder(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ApiJson(payload): ApiJson<CreateReminderRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let reminder = services::add(state.reminders.as_ref(), &account, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": "Reminder added successfully", "id": reminder.id })),
    ))
}

#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
) -> Result<Json<Vec<ReminderResponse>>, AppError> {
    let reminders = services::list(state.reminders.as_ref(), &account).await?;
    Ok(Json(reminders.into_iter().map(ReminderResponse::from).collect()))
}

#[instrument(skip(state, account, payload), fields(account_id = %account.id))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateReminderRequest>,
) -> Result<Json<Value>, AppError> {
    services::update(state.reminders.as_ref(), &account, id, payload).await?;
    Ok(Json(json!({ "success": "Reminder updated successfully" })))
}

#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    services::delete(state.reminders.as_ref(), &account, id).await?;
    Ok(Json(json!({ "success": "Reminder deleted successfully" })))
}
