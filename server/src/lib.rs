//! Task-tracking server: bearer-token authentication, per-request ownership
//! checks against SQLite, and field-scoped task updates.

use std::sync::Arc;

use shared::types::server_config::AppConfig;
use tokio_rusqlite::Connection;

pub mod auth;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod services;

use auth::token::TokenCodec;

/// Everything a handler needs, cloned per request.
///
/// `config` and `tokens` are built once at startup and never mutated; the
/// database handle is a cheap clone of a channel to the SQLite thread.
#[derive(Clone)]
pub struct AppState {
    pub db: Connection,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, tokens: TokenCodec) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("addr", &self.config.server.addr())
            .field("database", &self.config.database.path)
            .finish()
    }
}
