// handlers/public/auth/logout.rs - POST /auth/logout handler

use axum::{extract::State, Json};

use super::RefreshTokenRequest;
use crate::api::{JsonBody, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /auth/logout - Revoke one refresh token
///
/// Succeeds whether or not the token was still live.
pub async fn logout_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshTokenRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let token = request
        .token()
        .ok_or_else(|| ApiError::bad_request("Refresh token required"))?;

    state.auth.logout(token).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
