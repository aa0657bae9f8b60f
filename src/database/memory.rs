use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{Comment, Post, User};
use crate::database::repository::{
    CommentRepository, DatabaseError, PostRepository, Store, UserRepository,
};

/// In-process store used by the test suite and `--in-memory` runs.
/// Each collection lives behind one lock so session-list updates are atomic
/// just like single-document updates in MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, User>>,
    posts: RwLock<HashMap<ObjectId, Post>>,
    comments: RwLock<HashMap<ObjectId, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique(users: &HashMap<ObjectId, User>, candidate: &User) -> Result<(), DatabaseError> {
    for other in users.values().filter(|u| u.id != candidate.id) {
        if other.username == candidate.username {
            return Err(DatabaseError::Duplicate("username".to_string()));
        }
        if other.email == candidate.email {
            return Err(DatabaseError::Duplicate("email".to_string()));
        }
    }
    Ok(())
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, ObjectId),
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_users(&self, ids: &[ObjectId]) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn update_user_profile(&self, user: &User) -> Result<bool, DatabaseError> {
        let mut users = self.users.write().await;
        check_unique(&users, user)?;

        let Some(stored) = users.get_mut(&user.id) else {
            return Ok(false);
        };
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.password = user.password.clone();
        stored.profile_picture = user.profile_picture.clone();
        stored.bio = user.bio.clone();
        stored.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_user(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn push_refresh_token(
        &self,
        user_id: &ObjectId,
        digest: &str,
        max_sessions: usize,
    ) -> Result<bool, DatabaseError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        user.add_refresh_token(digest.to_string(), max_sessions);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn pull_refresh_token(&self, digest: &str) -> Result<bool, DatabaseError> {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.has_refresh_token(digest)) {
            Some(user) => {
                user.remove_refresh_token(digest);
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &ObjectId,
        old: &str,
        new: &str,
    ) -> Result<bool, DatabaseError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let rotated = user.replace_refresh_token(old, new.to_string());
        if rotated {
            user.updated_at = Utc::now();
        }
        Ok(rotated)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, DatabaseError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.values().cloned().collect(), |p| (p.created_at, p.id)))
    }

    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError> {
        let mut posts = self.posts.write().await;
        let Some(stored) = posts.get_mut(&post.id) else {
            return Ok(false);
        };
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        Ok(true)
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        Ok(self.posts.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError> {
        self.comments.write().await.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, DatabaseError> {
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn list_comments_for_post(&self, post_id: &ObjectId) -> Result<Vec<Comment>, DatabaseError> {
        let comments = self.comments.read().await;
        let matching = comments.values().filter(|c| &c.post == post_id).cloned().collect();
        Ok(newest_first(matching, |c| (c.created_at, c.id)))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError> {
        let mut comments = self.comments.write().await;
        let Some(stored) = comments.get_mut(&comment.id) else {
            return Ok(false);
        };
        stored.content = comment.content.clone();
        stored.updated_at = comment.updated_at;
        Ok(true)
    }

    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, DatabaseError> {
        Ok(self.comments.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
