use std::sync::LazyLock;

use shared::types::{Credentials, Role, TokenResponse};
use tracing::{info, warn};

use crate::AppState;
use crate::auth::Principal;
use crate::database::users::{self, NewUser};
use crate::database::utils::{
    hash_password, is_acceptable_password, is_unique_violation, is_valid_email, sanitize_string,
    verify_password,
};
use crate::errors::{AppError, AppResult};

/// Checked in place of a stored hash when the email is unknown, so both
/// sign-in failures cost one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

fn check_password(stored: Option<&str>, password: &str) -> AppResult<bool> {
    match stored {
        Some(hash) => Ok(verify_password(hash, password)?),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(dummy, password);
            }
            Ok(false)
        }
    }
}

/// Normalised, validated credentials for a new account.
pub fn validate_new_credentials(credentials: &Credentials) -> AppResult<(String, String)> {
    let email = sanitize_string(&credentials.email);
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("Invalid email address"));
    }
    if !is_acceptable_password(&credentials.password) {
        return Err(AppError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    Ok((email, credentials.password.clone()))
}

/// Register a regular user and sign them in.
pub async fn sign_up(state: &AppState, credentials: Credentials) -> AppResult<TokenResponse> {
    let (email, password) = validate_new_credentials(&credentials)?;
    let password_hash = hash_password(&password)?;

    let user_id = users::insert(
        &state.db,
        NewUser {
            email: email.clone(),
            password_hash,
            role: Role::User,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            warn!("Sign-up rejected, email already registered: {}", email);
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Store(e)
        }
    })?;

    info!("Registered user {} (id {})", email, user_id);

    let principal = Principal {
        user_id,
        subject: email,
        role: Role::User,
    };
    Ok(TokenResponse::new(state.tokens.issue(&principal)?))
}

/// Exchange email and password for a token.
///
/// Unknown email and wrong password are the same failure so callers cannot
/// probe which emails are registered.
pub async fn sign_in(state: &AppState, credentials: Credentials) -> AppResult<TokenResponse> {
    let email = sanitize_string(&credentials.email);

    let user = users::find_by_email(&state.db, email.clone()).await?;
    let matched = check_password(
        user.as_ref().map(|u| u.password_hash.as_str()),
        &credentials.password,
    )?;

    let Some(user) = user.filter(|_| matched) else {
        warn!("Sign-in failed for {}", email);
        return Err(AppError::InvalidCredentials);
    };

    info!("User {} signed in", user.id);
    Ok(TokenResponse::new(
        state.tokens.issue(&Principal::from(&user))?,
    ))
}
