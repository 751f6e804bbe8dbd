pub mod comments;
pub mod create;
pub mod tasks;
pub mod users;
pub mod utils;

pub use create::{create_tables, open};
