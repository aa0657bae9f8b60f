pub mod extract;
pub mod format;

pub use extract::JsonBody;
pub use format::{
    load_owners, AuthResponse, CommentView, MessageResponse, OwnerSummary, PostView, UserView,
};
