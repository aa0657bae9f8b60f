// handlers/public/comments.rs - Read-only comment endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{load_owners, CommentView};
use crate::database::CommentRepository;
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::state::AppState;

/// GET /comments/post/:postId - Comments on one post, newest first
///
/// An unknown post simply has no comments.
pub async fn post_comments_get(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let post_id = parse_id(&post_id, "Post")?;
    let comments = state.store.list_comments_for_post(&post_id).await?;
    let owners = load_owners(state.store.as_ref(), comments.iter().map(|c| c.owner)).await?;

    Ok(Json(comments.iter().map(|c| CommentView::new(c, &owners)).collect()))
}

/// GET /comments/:id
pub async fn comment_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentView>> {
    let id = parse_id(&id, "Comment")?;
    let comment = state
        .store
        .find_comment(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let owners = load_owners(state.store.as_ref(), [comment.owner]).await?;

    Ok(Json(CommentView::new(&comment, &owners)))
}
