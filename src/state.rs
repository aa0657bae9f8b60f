use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::SecurityConfig;
use crate::database::Store;
use crate::services::AuthService;

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, security: &SecurityConfig) -> Self {
        let tokens = Arc::new(TokenService::new(security));
        let auth = AuthService::new(store.clone(), tokens.clone(), security.max_sessions);

        Self { store, tokens, auth }
    }
}
