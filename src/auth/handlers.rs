use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AccessResponse, LoginRequest, LoginResponse, PublicUser, RefreshRequest, RegisterRequest,
        UserSummary,
    },
    extractors::AuthUser,
    services,
};
use crate::{error::AppError, extract::ApiJson, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(obtain_token))
        .route("/signin", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .route("/signout", get(signout))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    services::register(state.accounts.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": "User created successfully" })),
    ))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let account =
        services::authenticate(state.accounts.as_ref(), &payload.username, &payload.password)
            .await?;
    let tokens = services::issue_tokens(&state.keys, &account)?;
    Ok(Json(LoginResponse {
        tokens,
        user: PublicUser::from(&account),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<AccessResponse>, AppError> {
    let access = services::refresh(state.accounts.as_ref(), &state.keys, &payload.refresh).await?;
    Ok(Json(AccessResponse { access }))
}

/// Advisory only: issued tokens stay valid until they expire.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn signout(AuthUser(account): AuthUser) -> Json<Value> {
    info!("user signed out");
    Json(json!({ "success": "You have logged out successfully" }))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    // TODO: require an access token here once the mobile client sends one for the directory view
    warn!("serving unauthenticated user directory");
    let users = state.accounts.list().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}
