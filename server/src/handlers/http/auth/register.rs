use bytes::Bytes;
use hyper::{Request, StatusCode};
use shared::types::Credentials;
use tracing::info;

use crate::AppState;
use crate::errors::AppResult;
use crate::handlers::http::utils::{HttpResponse, deliver_success_json, read_json};
use crate::services;

/// POST /api/register
///
/// Creates a regular user and returns a token so the client is signed in
/// straight away.
pub async fn handle_register(req: Request<Bytes>, state: AppState) -> AppResult<HttpResponse> {
    info!("Processing registration request");

    let credentials: Credentials = read_json(&req)?;
    let token = services::auth::sign_up(&state, credentials).await?;

    Ok(deliver_success_json(Some(token), StatusCode::CREATED)?)
}
