pub mod memory;
pub mod models;
pub mod mongo;
pub mod repository;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use repository::{CommentRepository, DatabaseError, PostRepository, Store, UserRepository};
