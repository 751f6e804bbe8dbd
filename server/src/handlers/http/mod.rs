pub mod admin;
pub mod auth;
pub mod comments;
pub mod routes;
pub mod tasks;
pub mod utils;

pub use routes::{Router, build_api_router};
