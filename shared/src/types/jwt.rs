use serde::{Deserialize, Serialize};

use crate::types::user::Role;

/// Claims embedded in every token issued by the server.
///
/// Only `sub` and `exp` take part in verification. `id` and `role` ride
/// along for clients that want to render something without a round-trip;
/// the server never trusts them and re-resolves the user from `sub` on every
/// request, so a role change takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Standard JWT subject — the user's email.
    pub sub: String,

    /// Numeric user ID (matches `users.id`).
    pub id: i64,

    /// Role at issue time.
    pub role: Role,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: u64,
}
