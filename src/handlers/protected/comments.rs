// handlers/protected/comments.rs - Comment writes (bearer token + ownership)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::{load_owners, CommentView, JsonBody, MessageResponse};
use crate::database::models::Comment;
use crate::database::{CommentRepository, PostRepository};
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::ensure_author_exists;

#[derive(Debug, Default, Deserialize)]
pub struct CommentInput {
    pub content: Option<String>,
}

impl CommentInput {
    fn content(&self) -> ApiResult<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::bad_request("Content is required"))
    }
}

async fn owned_comment(state: &AppState, raw_id: &str, user: &AuthUser) -> ApiResult<Comment> {
    let id = parse_id(raw_id, "Comment")?;
    let comment = state
        .store
        .find_comment(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if !comment.is_owned_by(&user.user_id) {
        tracing::warn!(comment_id = %comment.id, user_id = %user.user_id, "Comment ownership check failed");
        return Err(ApiError::forbidden("Not authorized to modify this comment"));
    }
    Ok(comment)
}

async fn render(state: &AppState, comment: &Comment) -> ApiResult<Json<CommentView>> {
    let owners = load_owners(state.store.as_ref(), [comment.owner]).await?;
    Ok(Json(CommentView::new(comment, &owners)))
}

/// POST /comments/:postId
pub async fn comment_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let content = input.content()?;
    let post_id = parse_id(&post_id, "Post")?;
    if state.store.find_post(&post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }

    ensure_author_exists(&state, &user).await?;
    let comment = Comment::new(post_id, user.user_id, content.to_string());
    state.store.insert_comment(&comment).await?;

    info!(comment_id = %comment.id, post_id = %post_id, owner = %user.user_id, "Comment created");
    let Json(view) = render(&state, &comment).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /comments/:id - Replaces the content and bumps `updatedAt`
pub async fn comment_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> ApiResult<Json<CommentView>> {
    let mut comment = owned_comment(&state, &id, &user).await?;

    comment.content = input.content()?.to_string();
    comment.updated_at = Utc::now();

    if !state.store.update_comment(&comment).await? {
        return Err(ApiError::not_found("Comment not found"));
    }

    info!(comment_id = %comment.id, "Comment updated");
    render(&state, &comment).await
}

/// DELETE /comments/:id
pub async fn comment_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = owned_comment(&state, &id, &user).await?;

    if !state.store.delete_comment(&comment.id).await? {
        return Err(ApiError::not_found("Comment not found"));
    }

    info!(comment_id = %comment.id, "Comment deleted");
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
