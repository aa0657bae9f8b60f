pub mod password;

use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims shared by access and refresh tokens; the two kinds differ only by
/// signing secret and lifetime.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as hex)
    pub sub: String,
    /// Unique per token so two tokens minted in the same second never collide
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &ObjectId, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_hex(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid or expired token")]
    InvalidToken,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies the access/refresh token pair.
///
/// Access tokens are stateless: signature and expiry are the whole check.
/// Refresh tokens are only half-checked here; callers must also confirm the
/// token's digest is still in the owner's stored session list.
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            access: SigningKeys::from_secret(&security.access_token_secret),
            refresh: SigningKeys::from_secret(&security.refresh_token_secret),
            access_ttl: Duration::minutes(security.access_token_ttl_minutes),
            refresh_ttl: Duration::days(security.refresh_token_ttl_days),
        }
    }

    pub fn issue(&self, user_id: &ObjectId) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: sign(&self.access, Claims::new(user_id, self.access_ttl))?,
            refresh_token: sign(&self.refresh, Claims::new(user_id, self.refresh_ttl))?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<ObjectId, JwtError> {
        verify(&self.access, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<ObjectId, JwtError> {
        verify(&self.refresh, token)
    }
}

/// Stored form of a refresh token. Session lists never hold raw tokens.
pub fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn sign(keys: &SigningKeys, claims: Claims) -> Result<String, JwtError> {
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn verify(keys: &SigningKeys, token: &str) -> Result<ObjectId, JwtError> {
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            JwtError::InvalidToken
        })?;

    ObjectId::parse_str(&token_data.claims.sub).map_err(|_| JwtError::InvalidToken)
}
