// handlers/public/users.rs - /users CRUD (no authentication)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{JsonBody, MessageResponse, UserView};
use crate::database::UserRepository;
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::services::{user_service, NewUser, UserPatch};
use crate::state::AppState;

/// GET /users
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// POST /users - Same validation and uniqueness rules as registration, no tokens
pub async fn users_post(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let user = user_service::create_user(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

/// GET /users/:id
pub async fn user_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    let id = parse_id(&id, "User")?;
    let user = state
        .store
        .find_user(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserView::from(&user)))
}

/// PUT /users/:id - Partial update; a new password is re-hashed
pub async fn user_put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> ApiResult<Json<UserView>> {
    let id = parse_id(&id, "User")?;
    let user = user_service::update_user(state.store.as_ref(), &id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserView::from(&user)))
}

/// DELETE /users/:id
///
/// Posts and comments by the user are kept and render with a `null` owner.
pub async fn user_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, "User")?;
    if !state.store.delete_user(&id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}
