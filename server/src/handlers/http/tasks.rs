use bytes::Bytes;
use hyper::{Request, StatusCode};
use shared::types::{TaskCreate, TaskUpdate};

use crate::AppState;
use crate::auth::Principal;
use crate::errors::AppResult;
use crate::handlers::http::utils::{
    HttpResponse, PathParams, deliver_success_json, page_request, read_json, task_filter,
};
use crate::services;

/// GET /api/tasks
pub async fn handle_list_tasks(
    req: Request<Bytes>,
    state: AppState,
    _params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let filter = task_filter(req.uri())?;
    let page = page_request(req.uri())?;

    let tasks = services::tasks::list(&state.db, filter, page).await?;
    Ok(deliver_success_json(Some(tasks), StatusCode::OK)?)
}

/// GET /api/tasks/:id
pub async fn handle_get_task(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    let task = services::tasks::get(&state.db, params.id("id")?).await?;
    Ok(deliver_success_json(Some(task), StatusCode::OK)?)
}

/// POST /api/tasks
pub async fn handle_create_task(
    req: Request<Bytes>,
    state: AppState,
    _params: PathParams,
    principal: Principal,
) -> AppResult<HttpResponse> {
    let request: TaskCreate = read_json(&req)?;
    let task = services::tasks::create(&state.db, &principal, request).await?;
    Ok(deliver_success_json(Some(task), StatusCode::CREATED)?)
}

/// PUT /api/tasks/:id
///
/// Fields the caller may not touch are dropped; the response shows what was
/// actually stored.
pub async fn handle_update_task(
    req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    principal: Principal,
) -> AppResult<HttpResponse> {
    let task_id = params.id("id")?;
    let changes: TaskUpdate = read_json(&req)?;

    let task = services::tasks::update(&state.db, &principal, task_id, changes).await?;
    Ok(deliver_success_json(Some(task), StatusCode::OK)?)
}

/// DELETE /api/tasks/:id
pub async fn handle_delete_task(
    _req: Request<Bytes>,
    state: AppState,
    params: PathParams,
    _principal: Principal,
) -> AppResult<HttpResponse> {
    services::tasks::delete(&state.db, params.id("id")?).await?;
    Ok(deliver_success_json::<()>(None, StatusCode::OK)?)
}
