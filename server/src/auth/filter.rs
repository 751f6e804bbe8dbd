use hyper::Request;
use tracing::{debug, warn};

use crate::AppState;
use crate::auth::principal::{self, Principal};
use crate::errors::AppResult;
use crate::handlers::http::utils::headers::get_bearer_token;

/// Attach a [`Principal`] to `req` when it carries a valid bearer token.
///
/// Never rejects on its own: a missing, malformed, forged or expired token
/// just leaves the request anonymous and the route's policy decides. Only a
/// storage failure while resolving the subject is an error.
pub async fn authenticate<B>(req: &mut Request<B>, state: &AppState) -> AppResult<()> {
    if req.extensions().get::<Principal>().is_some() {
        return Ok(());
    }

    let Some(token) = get_bearer_token(req.headers()) else {
        return Ok(());
    };

    let Some(subject) = state.tokens.extract_subject(&token) else {
        warn!("Rejected bearer token on {} {}", req.method(), req.uri().path());
        return Ok(());
    };

    let Some(resolved) = principal::resolve(&state.db, &subject).await? else {
        warn!("Token subject {} no longer exists", subject);
        return Ok(());
    };

    if !state.tokens.verify(&token, &resolved) {
        warn!("Token failed verification for {}", subject);
        return Ok(());
    }

    debug!("Authenticated {} (id {})", resolved.subject, resolved.user_id);
    req.extensions_mut().insert(resolved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenCodec;
    use crate::database::users::{self, NewUser};
    use crate::database::{create_tables, open};
    use shared::types::Role;
    use shared::types::server_config::AppConfig;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    async fn state() -> AppState {
        let db = open(":memory:").await.unwrap();
        create_tables(&db).await.unwrap();
        users::insert(
            &db,
            NewUser {
                email: "a@x.com".into(),
                password_hash: "h".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        AppState::new(db, AppConfig::default(), TokenCodec::new(SECRET, 3600))
    }

    fn request(auth: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/api/tasks");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_attaches_principal() {
        let state = state().await;
        let who = principal::resolve(&state.db, "a@x.com").await.unwrap().unwrap();
        let token = state.tokens.issue(&who).unwrap();

        let mut req = request(Some(&format!("Bearer {}", token)));
        authenticate(&mut req, &state).await.unwrap();
        assert_eq!(req.extensions().get::<Principal>(), Some(&who));
    }

    #[tokio::test]
    async fn bad_tokens_leave_request_anonymous() {
        let state = state().await;
        let ghost = Principal {
            user_id: 99,
            subject: "ghost@x.com".into(),
            role: Role::Admin,
        };
        let ghost_token = state.tokens.issue(&ghost).unwrap();

        for auth in [
            None,
            Some("Token abc".to_string()),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {}", ghost_token)),
        ] {
            let mut req = request(auth.as_deref());
            authenticate(&mut req, &state).await.unwrap();
            assert!(req.extensions().get::<Principal>().is_none());
        }
    }
}
