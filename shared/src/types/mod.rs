pub mod auth;
pub mod comment;
pub mod json_error;
pub mod jwt;
pub mod page;
pub mod server_config;
pub mod task;
pub mod user;

pub use self::auth::{Credentials, TokenResponse};
pub use self::comment::{CommentEdit, CommentView};
pub use self::json_error::ErrorResponse;
pub use self::jwt::JwtClaims;
pub use self::page::{Page, PageRequest};
pub use self::task::{Priority, Status, TaskCreate, TaskFilter, TaskUpdate, TaskView};
pub use self::user::{Role, UserEdit, UserView};
