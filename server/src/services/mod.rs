//! Business operations behind the HTTP handlers. Callers have already passed
//! the route's policy; what is left here is existence checks, validation and
//! the field policy on task updates.

pub mod auth;
pub mod comments;
pub mod tasks;
pub mod users;

#[cfg(test)]
pub(crate) async fn test_state() -> crate::AppState {
    use shared::types::server_config::AppConfig;

    let db = crate::database::open(":memory:").await.unwrap();
    crate::database::create_tables(&db).await.unwrap();
    crate::AppState::new(
        db,
        AppConfig::default(),
        crate::auth::TokenCodec::new(b"0123456789abcdef0123456789abcdef", 3600),
    )
}
