pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager, DuplicateField};
pub use models::{NewUser, User};
pub use repository::UserRepository;
