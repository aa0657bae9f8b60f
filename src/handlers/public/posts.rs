// handlers/public/posts.rs - Read-only post endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{load_owners, PostView};
use crate::database::PostRepository;
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::state::AppState;

/// GET /posts - Newest first, owners populated
pub async fn posts_get(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    let posts = state.store.list_posts().await?;
    let owners = load_owners(state.store.as_ref(), posts.iter().map(|p| p.owner)).await?;

    Ok(Json(posts.iter().map(|p| PostView::new(p, &owners)).collect()))
}

/// GET /posts/:id
pub async fn post_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostView>> {
    let id = parse_id(&id, "Post")?;
    let post = state
        .store
        .find_post(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    let owners = load_owners(state.store.as_ref(), [post.owner]).await?;

    Ok(Json(PostView::new(&post, &owners)))
}
