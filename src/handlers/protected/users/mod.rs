pub mod delete;
pub mod detail;
pub mod list;

pub use delete::delete;
pub use detail::{get, me};
pub use list::list;
