// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::State, http::StatusCode, Json};

use crate::api::{AuthResponse, JsonBody};
use crate::error::ApiResult;
use crate::services::NewUser;
use crate::state::AppState;

/// POST /auth/register - Create an account and start its first session
///
/// Input: `{ "username", "email", "password", "profilePicture"?, "bio"? }`
///
/// Output (201): `{ "_id", "username", "email", "accessToken", "refreshToken" }`
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (user, tokens) = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, tokens))))
}
