use hyper::StatusCode;
use thiserror::Error;

/// Every outcome a handler can signal to the HTTP boundary.
///
/// The router turns these into JSON error bodies; nothing below the router
/// builds an error response by hand.
#[derive(Error, Debug)]
pub enum AppError {
    /// No principal on a route that needs one.
    #[error("authentication required")]
    Unauthenticated,

    /// Sign-in failed. Unknown email and wrong password both land here.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Principal present but the route's policy said no.  For non-admins
    /// this also covers resources that do not exist.
    #[error("access denied")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Store(#[from] tokio_rusqlite::Error),

    #[error("token error: {0}")]
    Token(#[from] crate::auth::token::TokenError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// True for failures the caller cannot fix; these get logged with `error!`.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Token(_) | Self::Internal(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Token(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Store(_) | Self::Token(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the caller.  Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Token(_) | Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
