// handlers/protected/mod.rs - Bearer token required
//
// Every handler here receives `Extension<AuthUser>` from
// `jwt_auth_middleware` and enforces ownership before mutating.

pub mod comments;
pub mod posts;

use crate::database::UserRepository;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// A still-valid access token can outlive its user
async fn ensure_author_exists(state: &AppState, user: &AuthUser) -> ApiResult<()> {
    if state.store.find_user(&user.user_id).await?.is_none() {
        return Err(ApiError::unauthorized("User no longer exists"));
    }
    Ok(())
}
