// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};

use crate::api::{AuthResponse, JsonBody};
use crate::error::ApiResult;
use crate::services::LoginRequest;
use crate::state::AppState;

/// POST /auth/login - Authenticate by email and password
///
/// Each successful login opens an additional session; older sessions stay
/// valid until they are logged out or evicted by the session limit.
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (user, tokens) = state.auth.login(request).await?;
    Ok(Json(AuthResponse::new(&user, tokens)))
}
