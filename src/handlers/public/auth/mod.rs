// handlers/public/auth/mod.rs - Token acquisition and session management
//
// register/login hand out an access + refresh pair, refresh rotates the
// refresh token, logout revokes it.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

use serde::Deserialize;

pub use login::login_post;
pub use logout::logout_post;
pub use refresh::refresh_post;
pub use register::register_post;

/// Body of `/auth/logout` and `/auth/refresh`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    /// The token, if present and non-blank
    pub fn token(&self) -> Option<&str> {
        self.refresh_token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}
