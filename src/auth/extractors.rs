use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::{repo::Account, services};
use crate::{error::AppError, state::AppState};

/// The account behind a valid `Authorization: Bearer <access>` header.
pub struct AuthUser(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthenticated("missing Authorization header"))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Unauthenticated("invalid auth scheme"))?;

        match services::verify(state.accounts.as_ref(), &state.keys, token.trim()).await {
            Ok(account) => Ok(AuthUser(account)),
            Err(e) => {
                warn!("invalid or expired token");
                Err(e)
            }
        }
    }
}
