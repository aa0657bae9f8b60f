use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub owner: ObjectId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(owner: ObjectId, title: String, content: String) -> Self {
        Self {
            id: ObjectId::new(),
            title,
            content,
            owner,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.owner == user_id
    }
}
