// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, user management and read-only access to posts and
// comments. User CRUD is deliberately open; see DESIGN.md.

pub mod auth;
pub mod comments;
pub mod posts;
pub mod root;
pub mod users;
