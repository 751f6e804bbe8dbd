pub mod users;

pub use users::{handle_delete_user, handle_get_user, handle_get_users, handle_update_user};
