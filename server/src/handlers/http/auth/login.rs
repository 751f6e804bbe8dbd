use bytes::Bytes;
use hyper::{Request, StatusCode};
use shared::types::Credentials;
use tracing::info;

use crate::AppState;
use crate::errors::AppResult;
use crate::handlers::http::utils::{HttpResponse, deliver_success_json, read_json};
use crate::services;

/// POST /api/login
pub async fn handle_login(req: Request<Bytes>, state: AppState) -> AppResult<HttpResponse> {
    info!("Processing login request");

    let credentials: Credentials = read_json(&req)?;
    let token = services::auth::sign_in(&state, credentials).await?;

    Ok(deliver_success_json(Some(token), StatusCode::OK)?)
}
