use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::password::hash_password;
use crate::database::models::User;
use crate::database::{Store, UserRepository};
use crate::services::validation::{self, collect, FieldErrors};
use crate::services::AuthError;

/// Registration/creation payload. Missing fields deserialize as empty and
/// are reported by validation rather than by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

/// Validates, normalizes and hashes a new account. Nothing is written.
pub fn build_user(input: NewUser, refresh_tokens: Vec<String>) -> Result<User, AuthError> {
    let username = validation::normalize_username(&input.username);
    let email = validation::normalize_email(&input.email);
    let bio = input.bio.unwrap_or_default();

    let mut errors = FieldErrors::new();
    collect(&mut errors, "username", validation::validate_username_format(&username));
    collect(&mut errors, "email", validation::validate_email_format(&email));
    collect(&mut errors, "password", validation::validate_password_strength(&input.password));
    collect(&mut errors, "bio", validation::validate_bio(&bio));
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let password = hash_password(&input.password).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    let now = Utc::now();

    Ok(User {
        id: ObjectId::new(),
        username,
        email,
        password,
        profile_picture: input.profile_picture.unwrap_or_default().trim().to_string(),
        bio,
        refresh_tokens,
        created_at: now,
        updated_at: now,
    })
}

/// Fails with `AlreadyExists` when either the username or the email is taken
pub async fn ensure_available(
    store: &dyn Store,
    username: &str,
    email: &str,
    except: Option<&ObjectId>,
) -> Result<(), AuthError> {
    let taken_by_other = |user: Option<User>| match (user, except) {
        (Some(user), Some(id)) => &user.id != id,
        (Some(_), None) => true,
        (None, _) => false,
    };

    if taken_by_other(store.find_user_by_email(email).await?)
        || taken_by_other(store.find_user_by_username(username).await?)
    {
        return Err(AuthError::AlreadyExists);
    }
    Ok(())
}

pub async fn create_user(store: &dyn Store, input: NewUser) -> Result<User, AuthError> {
    let user = build_user(input, Vec::new())?;
    ensure_available(store, &user.username, &user.email, None).await?;
    store.insert_user(&user).await?;

    info!(user_id = %user.id, username = %user.username, "User created");
    Ok(user)
}

/// Returns `Ok(None)` when the user does not exist
pub async fn update_user(
    store: &dyn Store,
    id: &ObjectId,
    patch: UserPatch,
) -> Result<Option<User>, AuthError> {
    let Some(mut user) = store.find_user(id).await? else {
        return Ok(None);
    };

    let mut errors = FieldErrors::new();
    if let Some(username) = patch.username {
        user.username = validation::normalize_username(&username);
        collect(&mut errors, "username", validation::validate_username_format(&user.username));
    }
    if let Some(email) = patch.email {
        user.email = validation::normalize_email(&email);
        collect(&mut errors, "email", validation::validate_email_format(&user.email));
    }
    if let Some(bio) = patch.bio {
        collect(&mut errors, "bio", validation::validate_bio(&bio));
        user.bio = bio;
    }
    if let Some(profile_picture) = patch.profile_picture {
        user.profile_picture = profile_picture.trim().to_string();
    }
    if let Some(password) = &patch.password {
        collect(&mut errors, "password", validation::validate_password_strength(password));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    if let Some(password) = patch.password {
        user.password = hash_password(&password).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    }

    ensure_available(store, &user.username, &user.email, Some(id)).await?;
    if !store.update_user_profile(&user).await? {
        return Ok(None);
    }
    user.updated_at = Utc::now();

    info!(user_id = %user.id, "User updated");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn build_user_normalizes_and_hashes() {
        let user = build_user(new_user("  testuser ", " Test@Example.com"), Vec::new()).unwrap();
        assert_eq!(user.username, "testuser");
        assert_eq!(user.email, "test@example.com");
        assert_ne!(user.password, "password123");
        assert!(user.refresh_tokens.is_empty());
    }

    #[test]
    fn build_user_reports_every_invalid_field() {
        let err = build_user(NewUser::default(), Vec::new()).unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
    }

    #[tokio::test]
    async fn create_rejects_taken_username() {
        let store = MemoryStore::new();
        create_user(&store, new_user("testuser", "a@example.com")).await.unwrap();

        let err = create_user(&store, new_user("testuser", "b@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists));
    }

    #[tokio::test]
    async fn update_applies_partial_fields() {
        let store = MemoryStore::new();
        let user = create_user(&store, new_user("testuser", "a@example.com")).await.unwrap();

        let patch = UserPatch {
            bio: Some("hello".to_string()),
            email: Some("NEW@example.com".to_string()),
            ..Default::default()
        };
        let updated = update_user(&store, &user.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.bio, "hello");
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.username, "testuser");
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let store = MemoryStore::new();
        create_user(&store, new_user("first", "first@example.com")).await.unwrap();
        let second = create_user(&store, new_user("second", "second@example.com")).await.unwrap();

        let patch = UserPatch {
            email: Some("first@example.com".to_string()),
            ..Default::default()
        };
        let err = update_user(&store, &second.id, patch).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists));
    }

    #[tokio::test]
    async fn update_missing_user_is_none() {
        let store = MemoryStore::new();
        let result = update_user(&store, &ObjectId::new(), UserPatch::default()).await.unwrap();
        assert!(result.is_none());
    }
}
