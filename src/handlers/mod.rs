// handlers/mod.rs - Two-tier handler layout
//
// public    - no authentication (auth flows, user CRUD, reads)
// protected - bearer access token required (post/comment writes)
//
// The tier decides which router a handler is mounted on in `app.rs`;
// protected routers carry `jwt_auth_middleware` as a route layer.

pub mod protected;
pub mod public;

use bson::oid::ObjectId;

use crate::error::ApiError;

/// Path ids that are not valid ObjectIds cannot match any document, so they
/// get the same 404 as a missing resource.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", what)))
}
