use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sign-up / sign-in wire types
// ---------------------------------------------------------------------------

/// Body of both `/api/register` and `/api/login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub jwt: String,
}

impl TokenResponse {
    pub fn new(jwt: String) -> Self {
        Self { jwt }
    }
}
