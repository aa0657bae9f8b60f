use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;

use crate::database::models::{Comment, Post, User};

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Unique constraint violated; carries the offending field name
    #[error("Duplicate value for unique field: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Duplicate` when username or email is already taken
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;

    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<User>, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// Writes profile fields only; the session list is never touched here.
    /// Returns false when the user does not exist.
    async fn update_user_profile(&self, user: &User) -> Result<bool, DatabaseError>;

    async fn delete_user(&self, id: &ObjectId) -> Result<bool, DatabaseError>;

    /// Appends a refresh-token digest, keeping at most `max_sessions` (newest win)
    async fn push_refresh_token(
        &self,
        user_id: &ObjectId,
        digest: &str,
        max_sessions: usize,
    ) -> Result<bool, DatabaseError>;

    /// Removes a digest from whichever user holds it
    async fn pull_refresh_token(&self, digest: &str) -> Result<bool, DatabaseError>;

    /// Atomically replaces `old` with `new` for `user_id`. Returns false when
    /// `old` is not (or no longer) in that user's list.
    async fn rotate_refresh_token(
        &self,
        user_id: &ObjectId,
        old: &str,
        new: &str,
    ) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError>;

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, DatabaseError>;

    /// Newest first
    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError>;

    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError>;

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError>;

    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, DatabaseError>;

    /// Newest first
    async fn list_comments_for_post(&self, post_id: &ObjectId) -> Result<Vec<Comment>, DatabaseError>;

    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError>;

    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, DatabaseError>;
}

/// Everything the handlers need from persistence
#[async_trait]
pub trait Store: UserRepository + PostRepository + CommentRepository {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
