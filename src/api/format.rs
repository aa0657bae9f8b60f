//! Wire format for API responses.
//!
//! Stored documents are never serialized directly: ids go out as plain hex
//! strings and `password` / `refreshTokens` never leave the server.

use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::TokenPair;
use crate::database::models::{Comment, Post, User};
use crate::database::{DatabaseError, Store, UserRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The populated `owner` of a post or comment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: String,
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

pub type Owners = HashMap<ObjectId, OwnerSummary>;

/// Looks up the owners of a batch of posts or comments in one query.
/// Owners that no longer exist are simply absent and render as `null`.
pub async fn load_owners<I>(store: &dyn Store, ids: I) -> Result<Owners, DatabaseError>
where
    I: IntoIterator<Item = ObjectId>,
{
    let mut ids: Vec<ObjectId> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Ok(Owners::new());
    }

    let users = store.find_users(&ids).await?;
    Ok(users.iter().map(|u| (u.id, OwnerSummary::from(u))).collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: &Post, owners: &Owners) -> Self {
        Self {
            id: post.id.to_hex(),
            title: post.title.clone(),
            content: post.content.clone(),
            owner: owners.get(&post.owner).cloned(),
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub post: String,
    pub content: String,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: &Comment, owners: &Owners) -> Self {
        Self {
            id: comment.id.to_hex(),
            post: comment.post.to_hex(),
            content: comment.content.clone(),
            owner: owners.get(&comment.owner).cloned(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Body of a successful register or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
