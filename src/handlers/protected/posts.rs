// handlers/protected/posts.rs - Post writes (bearer token + ownership)

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::api::{load_owners, JsonBody, MessageResponse, PostView};
use crate::database::models::Post;
use crate::database::PostRepository;
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::ensure_author_exists;

#[derive(Debug, Default, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

fn required(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Loads the post and checks that `user` owns it
async fn owned_post(state: &AppState, raw_id: &str, user: &AuthUser) -> ApiResult<Post> {
    let id = parse_id(raw_id, "Post")?;
    let post = state
        .store
        .find_post(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if !post.is_owned_by(&user.user_id) {
        tracing::warn!(post_id = %post.id, user_id = %user.user_id, "Post ownership check failed");
        return Err(ApiError::forbidden("Not authorized to modify this post"));
    }
    Ok(post)
}

async fn render(state: &AppState, post: &Post) -> ApiResult<Json<PostView>> {
    let owners = load_owners(state.store.as_ref(), [post.owner]).await?;
    Ok(Json(PostView::new(post, &owners)))
}

/// POST /posts - Owner is the authenticated user
pub async fn post_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<PostInput>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let title = required(input.title.as_ref());
    let content = required(input.content.as_ref());
    let (Some(title), Some(content)) = (title, content) else {
        let mut field_errors = HashMap::new();
        if title.is_none() {
            field_errors.insert("title".to_string(), "Title is required".to_string());
        }
        if content.is_none() {
            field_errors.insert("content".to_string(), "Content is required".to_string());
        }
        return Err(ApiError::validation_error("Title and content are required", Some(field_errors)));
    };

    ensure_author_exists(&state, &user).await?;
    let post = Post::new(user.user_id, title.to_string(), content.to_string());
    state.store.insert_post(&post).await?;

    info!(post_id = %post.id, owner = %user.user_id, "Post created");
    let Json(view) = render(&state, &post).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /posts/:id - Partial update of title and/or content
pub async fn post_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PostInput>,
) -> ApiResult<Json<PostView>> {
    let mut post = owned_post(&state, &id, &user).await?;

    if let Some(title) = &input.title {
        post.title = required(Some(title))
            .ok_or_else(|| ApiError::bad_request("Title cannot be empty"))?
            .to_string();
    }
    if let Some(content) = &input.content {
        post.content = required(Some(content))
            .ok_or_else(|| ApiError::bad_request("Content cannot be empty"))?
            .to_string();
    }

    if !state.store.update_post(&post).await? {
        return Err(ApiError::not_found("Post not found"));
    }

    info!(post_id = %post.id, "Post updated");
    render(&state, &post).await
}

/// DELETE /posts/:id
pub async fn post_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let post = owned_post(&state, &id, &user).await?;

    if !state.store.delete_post(&post.id).await? {
        return Err(ApiError::not_found("Post not found"));
    }

    info!(post_id = %post.id, "Post deleted");
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}
