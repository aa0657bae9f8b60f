pub mod auth_service;
pub mod user_service;
pub mod validation;

pub use auth_service::{AuthError, AuthService, LoginRequest};
pub use user_service::{NewUser, UserPatch};
