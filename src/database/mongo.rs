use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::{Comment, Post, User};
use crate::database::repository::{
    CommentRepository, DatabaseError, PostRepository, Store, UserRepository,
};

const USERS: &str = "users";
const POSTS: &str = "posts";
const COMMENTS: &str = "comments";

const USERNAME_INDEX: &str = "users_username_unique";
const EMAIL_INDEX: &str = "users_email_unique";

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed store over the `users`, `posts` and `comments` collections
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        let timeout = Duration::from_secs(config.connection_timeout_secs);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.name));

        info!(database = %db.name(), "Connected to MongoDB");

        let store = Self { db };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Unique indexes back the username/email invariant under concurrent inserts
    async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        for (field, name) in [("username", USERNAME_INDEX), ("email", EMAIL_INDEX)] {
            let model = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).name(name.to_string()).build())
                .build();
            self.users().create_index(model).await?;
        }

        self.comments()
            .create_index(IndexModel::builder().keys(doc! { "post": 1 }).build())
            .await?;

        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn posts(&self) -> Collection<Post> {
        self.db.collection(POSTS)
    }

    fn comments(&self) -> Collection<Comment> {
        self.db.collection(COMMENTS)
    }
}

/// Maps duplicate-key write errors onto the field whose index was violated
fn map_write_error(err: mongodb::error::Error) -> DatabaseError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            let field = if write_error.message.contains(EMAIL_INDEX) {
                "email"
            } else {
                "username"
            };
            return DatabaseError::Duplicate(field.to_string());
        }
    }
    DatabaseError::Mongo(err)
}

fn now() -> bson::DateTime {
    bson::DateTime::from_chrono(Utc::now())
}

#[async_trait]
impl UserRepository for MongoStore {
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.users().insert_one(user).await.map_err(map_write_error)?;
        info!(user_id = %user.id, "User created in database");
        Ok(())
    }

    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, DatabaseError> {
        Ok(self.users().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users().find_one(doc! { "username": username }).await?)
    }

    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let cursor = self.users().find(doc! { "_id": { "$in": ids.to_vec() } }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let cursor = self.users().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_user_profile(&self, user: &User) -> Result<bool, DatabaseError> {
        let update = doc! {
            "$set": {
                "username": user.username.as_str(),
                "email": user.email.as_str(),
                "password": user.password.as_str(),
                "profilePicture": user.profile_picture.as_str(),
                "bio": user.bio.as_str(),
                "updatedAt": now(),
            }
        };
        let result = self
            .users()
            .update_one(doc! { "_id": user.id }, update)
            .await
            .map_err(map_write_error)?;

        if result.matched_count == 1 {
            info!(user_id = %user.id, "User updated in database");
        }
        Ok(result.matched_count == 1)
    }

    async fn delete_user(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        let result = self.users().delete_one(doc! { "_id": *id }).await?;
        if result.deleted_count == 1 {
            info!(user_id = %id, "User deleted from database");
        }
        Ok(result.deleted_count == 1)
    }

    async fn push_refresh_token(
        &self,
        user_id: &ObjectId,
        digest: &str,
        max_sessions: usize,
    ) -> Result<bool, DatabaseError> {
        let keep = -(max_sessions.max(1) as i64);
        let update = doc! {
            "$push": { "refreshTokens": { "$each": [digest], "$slice": keep } },
            "$set": { "updatedAt": now() },
        };
        let result = self.users().update_one(doc! { "_id": *user_id }, update).await?;
        Ok(result.matched_count == 1)
    }

    async fn pull_refresh_token(&self, digest: &str) -> Result<bool, DatabaseError> {
        let result = self
            .users()
            .update_one(
                doc! { "refreshTokens": digest },
                doc! { "$pull": { "refreshTokens": digest }, "$set": { "updatedAt": now() } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &ObjectId,
        old: &str,
        new: &str,
    ) -> Result<bool, DatabaseError> {
        // Matching on the old digest makes the swap a compare-and-set
        let result = self
            .users()
            .update_one(
                doc! { "_id": *user_id, "refreshTokens": old },
                doc! { "$set": { "refreshTokens.$": new, "updatedAt": now() } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }
}

#[async_trait]
impl PostRepository for MongoStore {
    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError> {
        self.posts().insert_one(post).await?;
        Ok(())
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, DatabaseError> {
        Ok(self.posts().find_one(doc! { "_id": *id }).await?)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let cursor = self
            .posts()
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError> {
        let result = self
            .posts()
            .update_one(
                doc! { "_id": post.id },
                doc! { "$set": { "title": post.title.as_str(), "content": post.content.as_str() } },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        let result = self.posts().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count == 1)
    }
}

#[async_trait]
impl CommentRepository for MongoStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError> {
        self.comments().insert_one(comment).await?;
        Ok(())
    }

    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, DatabaseError> {
        Ok(self.comments().find_one(doc! { "_id": *id }).await?)
    }

    async fn list_comments_for_post(&self, post_id: &ObjectId) -> Result<Vec<Comment>, DatabaseError> {
        let cursor = self
            .comments()
            .find(doc! { "post": *post_id })
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError> {
        let update = doc! {
            "$set": {
                "content": comment.content.as_str(),
                "updatedAt": bson::DateTime::from_chrono(comment.updated_at),
            }
        };
        let result = self.comments().update_one(doc! { "_id": comment.id }, update).await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        let result = self.comments().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count == 1)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
