// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::State, Json};

use super::RefreshTokenRequest;
use crate::api::JsonBody;
use crate::auth::TokenPair;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /auth/refresh - Exchange a refresh token for a new pair
///
/// The presented token is consumed: 401 when it is missing, 403 when it is
/// invalid, expired, logged out or already used. A missing or unreadable body
/// counts as a missing token.
pub async fn refresh_post(
    State(state): State<AppState>,
    body: Option<JsonBody<RefreshTokenRequest>>,
) -> ApiResult<Json<TokenPair>> {
    let request = body.map(|JsonBody(request)| request).unwrap_or_default();
    let token = request
        .token()
        .ok_or_else(|| ApiError::unauthorized("Refresh token required"))?;

    let tokens = state.auth.refresh(token).await?;
    Ok(Json(tokens))
}
