use bytes::Bytes;
use hyper::{Request, StatusCode};
use shared::types::CommentEdit;

use crate::AppState;
use crate::auth::Principal;
use crate::errors::AppResult;
use crate::handlers::http::utils::{
    HttpResponse, PathParams, deliver_success_json, page_request, read_json,
};
use crate::services;

/// GET /api/tasks/:task_id/comments
pub async fn handle_list_comments(
    req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let task_id = params.id("task_id")?;
    let page = page_request(req.uri())?;

    let comments = services::comments::list(&state.db, task_id, page).await?;
    Ok(deliver_success_json(Some(comments), StatusCode::OK)?)
}

/// GET /api/tasks/:task_id/comments/:id
pub async fn handle_get_comment(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let comment =
        services::comments::get(&state.db, params.id("task_id")?, params.id("id")?).await?;
    Ok(deliver_success_json(Some(comment), StatusCode::OK)?)
}

/// POST /api/tasks/:task_id/comments
pub async fn handle_create_comment(
    req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    principal: Principal,
) -> AppResult<HttpResponse> {
    let task_id = params.id("task_id")?;
    let edit: CommentEdit = read_json(&req)?;

    let comment = services::comments::create(&state.db, &principal, task_id, &edit.content).await?;
    Ok(deliver_success_json(Some(comment), StatusCode::CREATED)?)
}

/// PUT /api/tasks/:task_id/comments/:id
pub async fn handle_update_comment(
    req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let task_id = params.id("task_id")?;
    let comment_id = params.id("id")?;
    let edit: CommentEdit = read_json(&req)?;

    let comment = services::comments::update(&state.db, task_id, comment_id, &edit.content).await?;
    Ok(deliver_success_json(Some(comment), StatusCode::OK)?)
}

/// DELETE /api/tasks/:task_id/comments/:id
pub async fn handle_delete_comment(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    services::comments::delete(&state.db, params.id("task_id")?, params.id("id")?).await?;
    Ok(deliver_success_json::<()>(None, StatusCode::OK)?)
}
