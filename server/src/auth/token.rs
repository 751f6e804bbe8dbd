//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying [`JwtClaims`]. The codec is built once at
//! startup from the configured secret and shared read-only.

use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use shared::types::JwtClaims;
use thiserror::Error;
use tracing::debug;

use crate::auth::principal::Principal;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("system clock is before the Unix epoch: {0}")]
    Clock(#[from] SystemTimeError),

    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign a token for `principal`, valid from now for the configured ttl.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.issue_at(principal, now)
    }

    pub fn issue_at(&self, principal: &Principal, issued_at: u64) -> Result<String, TokenError> {
        let claims = JwtClaims {
            sub: principal.subject.clone(),
            id: principal.user_id,
            role: principal.role,
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// True only if `token` is correctly signed, unexpired and issued for
    /// `principal`'s subject. Never errors.
    pub fn verify(&self, token: &str, principal: &Principal) -> bool {
        match self.decode(token) {
            Some(claims) => claims.sub == principal.subject,
            None => false,
        }
    }

    /// Subject of a valid token. `None` for anything malformed, forged or
    /// expired.
    pub fn extract_subject(&self, token: &str) -> Option<String> {
        self.decode(token).map(|claims| claims.sub)
    }

    fn decode(&self, token: &str) -> Option<JwtClaims> {
        match decode::<JwtClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Token rejected: {}", e);
                None
            }
        }
    }
}
