use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Always stored trimmed and lowercased
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub bio: String,
    /// SHA-256 digests of live refresh tokens, oldest first
    #[serde(default)]
    pub refresh_tokens: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_refresh_token(&self, digest: &str) -> bool {
        self.refresh_tokens.iter().any(|t| t == digest)
    }

    /// Appends a session, evicting the oldest ones beyond `max_sessions`.
    pub fn add_refresh_token(&mut self, digest: String, max_sessions: usize) {
        self.refresh_tokens.retain(|t| t != &digest);
        self.refresh_tokens.push(digest);

        let max = max_sessions.max(1);
        if self.refresh_tokens.len() > max {
            let excess = self.refresh_tokens.len() - max;
            self.refresh_tokens.drain(..excess);
        }
    }

    pub fn remove_refresh_token(&mut self, digest: &str) -> bool {
        let before = self.refresh_tokens.len();
        self.refresh_tokens.retain(|t| t != digest);
        self.refresh_tokens.len() != before
    }

    /// Swaps `old` for `new` in place. Fails (returns false) when `old` is gone,
    /// which is what makes a refresh token single-use.
    pub fn replace_refresh_token(&mut self, old: &str, new: String) -> bool {
        match self.refresh_tokens.iter_mut().find(|t| t.as_str() == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: ObjectId::new(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "hash".to_string(),
            profile_picture: String::new(),
            bio: String::new(),
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_list_is_bounded_oldest_first() {
        let mut user = user();
        for i in 0..5 {
            user.add_refresh_token(format!("t{}", i), 3);
        }
        assert_eq!(user.refresh_tokens, vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn zero_bound_still_keeps_newest() {
        let mut user = user();
        user.add_refresh_token("a".to_string(), 0);
        user.add_refresh_token("b".to_string(), 0);
        assert_eq!(user.refresh_tokens, vec!["b"]);
    }

    #[test]
    fn replace_is_single_use() {
        let mut user = user();
        user.add_refresh_token("old".to_string(), 10);

        assert!(user.replace_refresh_token("old", "new".to_string()));
        assert!(!user.replace_refresh_token("old", "newer".to_string()));
        assert!(user.has_refresh_token("new"));
        assert!(!user.has_refresh_token("old"));
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut user = user();
        user.add_refresh_token("a".to_string(), 10);
        assert!(user.remove_refresh_token("a"));
        assert!(!user.remove_refresh_token("a"));
    }
}
