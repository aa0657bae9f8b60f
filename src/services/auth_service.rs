use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::auth::{digest, JwtError, TokenPair, TokenService};
use crate::database::models::User;
use crate::database::{DatabaseError, Store, UserRepository};
use crate::services::user_service::{build_user, ensure_available, NewUser};
use crate::services::validation::{self, FieldErrors};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Register, login, logout and refresh-token rotation.
///
/// Every refresh token handed out is recorded as a digest in its owner's
/// session list; the list is the source of truth for whether a refresh
/// token is still live.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    max_sessions: usize,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, max_sessions: usize) -> Self {
        Self {
            store,
            tokens,
            max_sessions,
        }
    }

    pub async fn register(&self, input: NewUser) -> Result<(User, TokenPair), AuthError> {
        let mut user = build_user(input, Vec::new())?;
        ensure_available(self.store.as_ref(), &user.username, &user.email, None).await?;

        let pair = self.tokens.issue(&user.id)?;
        user.refresh_tokens = vec![digest(&pair.refresh_token)];

        self.store.insert_user(&user).await.map_err(|e| match e {
            // Lost a race with a concurrent registration
            DatabaseError::Duplicate(_) => AuthError::AlreadyExists,
            other => AuthError::Database(other),
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok((user, pair))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<(User, TokenPair), AuthError> {
        let email = validation::normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!(email = %email, "Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = verify_password(&request.password, &user.password)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue(&user.id)?;
        if !self
            .store
            .push_refresh_token(&user.id, &digest(&pair.refresh_token), self.max_sessions)
            .await?
        {
            // Deleted between lookup and session write
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok((user, pair))
    }

    /// Always succeeds for well-formed input; returns whether a session was removed.
    pub async fn logout(&self, refresh_token: &str) -> Result<bool, AuthError> {
        let removed = self.store.pull_refresh_token(&digest(refresh_token)).await?;
        if removed {
            info!("Session logged out");
        } else {
            info!("Logout for unknown refresh token");
        }
        Ok(removed)
    }

    /// Exchanges a live refresh token for a new pair. The old token's digest is
    /// swapped for the new one in a single conditional write, so only one of
    /// two concurrent refreshes with the same token can succeed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let user_id = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let pair = self.tokens.issue(&user_id)?;
        let rotated = self
            .store
            .rotate_refresh_token(&user_id, &digest(refresh_token), &digest(&pair.refresh_token))
            .await?;

        if !rotated {
            warn!(user_id = %user_id, "Refresh token not in session list");
            return Err(AuthError::InvalidRefreshToken);
        }

        info!(user_id = %user_id, "Refresh token rotated");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn service_with(max_sessions: usize) -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(&AppConfig::development().security));
        let service = AuthService::new(store.clone(), tokens, max_sessions);
        (service, store)
    }

    fn registration(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            ..Default::default()
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_stores_a_single_session_digest() {
        let (auth, store) = service_with(10);
        let (user, pair) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let stored = store.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_tokens, vec![digest(&pair.refresh_token)]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (auth, _) = service_with(10);
        auth.register(registration("first", "test@example.com")).await.unwrap();

        let err = auth.register(registration("second", "TEST@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists));
    }

    #[tokio::test]
    async fn login_normalizes_email_and_issues_distinct_tokens() {
        let (auth, _) = service_with(10);
        auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let (_, first) = auth.login(login("  Test@Example.com ", "password123")).await.unwrap();
        let (_, second) = auth.login(login("test@example.com", "password123")).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (auth, _) = service_with(10);
        auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let wrong = auth.login(login("test@example.com", "nope")).await.unwrap_err();
        let unknown = auth.login(login("nobody@example.com", "password123")).await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() {
        let (auth, _) = service_with(10);
        let (_, pair) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let rotated = auth.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let reused = auth.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(reused, AuthError::InvalidRefreshToken));

        // The replacement is still live
        auth.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let (auth, _) = service_with(10);
        let (_, pair) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let err = auth.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_revokes() {
        let (auth, _) = service_with(10);
        let (_, pair) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        assert!(auth.logout(&pair.refresh_token).await.unwrap());
        assert!(!auth.logout(&pair.refresh_token).await.unwrap());
        assert!(!auth.logout("never-issued").await.unwrap());

        let err = auth.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn session_list_stays_bounded() {
        let (auth, store) = service_with(3);
        let (user, first) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        for _ in 0..5 {
            auth.login(login("test@example.com", "password123")).await.unwrap();
        }

        let stored = store.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_tokens.len(), 3);

        // The registration session was evicted first
        let err = auth.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn concurrent_refresh_has_one_winner() {
        let (auth, store) = service_with(10);
        let (user, pair) = auth.register(registration("testuser", "test@example.com")).await.unwrap();

        let (a, b) = tokio::join!(
            auth.refresh(&pair.refresh_token),
            auth.refresh(&pair.refresh_token)
        );

        let (winner, loser) = match (a, b) {
            (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
            (a, b) => panic!("expected exactly one successful refresh, got {:?} and {:?}", a.is_ok(), b.is_ok()),
        };
        assert!(matches!(loser, AuthError::InvalidRefreshToken));

        let stored = store.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_tokens, vec![digest(&winner.refresh_token)]);
    }
}
