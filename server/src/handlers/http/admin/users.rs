use bytes::Bytes;
use hyper::{Request, StatusCode};
use shared::types::UserEdit;
use tracing::info;

use crate::AppState;
use crate::auth::Principal;
use crate::errors::AppResult;
use crate::handlers::http::utils::{
    HttpResponse, PathParams, deliver_success_json, page_request, read_json,
};
use crate::services;

// Every route here is registered behind `Policy::admin()`.

/// GET /api/users
pub async fn handle_get_users(
    req: Request<Bytes>,
    state: AppState,
    _params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    info!("Serving user list");

    let page = services::users::list(&state.db, page_request(req.uri())?).await?;
    Ok(deliver_success_json(Some(page), StatusCode::OK)?)
}

/// GET /api/users/:id
pub async fn handle_get_user(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let user = services::users::get(&state.db, params.id("id")?).await?;
    Ok(deliver_success_json(Some(user), StatusCode::OK)?)
}

/// PUT /api/users/:id
pub async fn handle_update_user(
    req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    principal: Principal,
) -> AppResult<HttpResponse> {
    let user_id = params.id("id")?;
    let edit: UserEdit = read_json(&req)?;

    info!("Admin {} updating user {}", principal.user_id, user_id);
    let user = services::users::update(&state.db, user_id, edit).await?;
    Ok(deliver_success_json(Some(user), StatusCode::OK)?)
}

/// DELETE /api/users/:id
pub async fn handle_delete_user(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    principal: Principal,
) -> AppResult<HttpResponse> {
    let user_id = params.id("id")?;
    services::users::delete(&state.db, &principal, user_id).await?;
    Ok(deliver_success_json::<()>(None, StatusCode::OK)?)
}
