use shared::types::{Page, PageRequest, TaskCreate, TaskFilter, TaskUpdate, TaskView};
use tokio_rusqlite::Connection;
use tracing::{info, warn};

use crate::auth::Principal;
use crate::database::tasks::{self, NewTask, TaskRecord};
use crate::database::users;
use crate::database::utils::sanitize_string;
use crate::errors::{AppError, AppResult};

fn clean_title(title: &str) -> AppResult<String> {
    let title = sanitize_string(title);
    if title.is_empty() {
        return Err(AppError::bad_request("Title cannot be empty"));
    }
    Ok(title)
}

async fn ensure_user_exists(conn: &Connection, user_id: i64) -> AppResult<()> {
    match users::find_by_id(conn, user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Executor")),
    }
}

/// Create a task authored by `principal`. Status always starts at `NEW`.
pub async fn create(
    conn: &Connection,
    principal: &Principal,
    request: TaskCreate,
) -> AppResult<TaskView> {
    let title = clean_title(&request.title)?;
    if let Some(executor_id) = request.executor_id {
        ensure_user_exists(conn, executor_id).await?;
    }

    let task = tasks::insert(
        conn,
        NewTask {
            title,
            description: request.description,
            priority: request.priority,
            author_id: principal.user_id,
            executor_id: request.executor_id,
        },
    )
    .await?;

    info!("Task {} created by user {}", task.id, principal.user_id);
    Ok(task.to_view())
}

pub async fn get(conn: &Connection, task_id: i64) -> AppResult<TaskView> {
    tasks::find_by_id(conn, task_id)
        .await?
        .map(|task| task.to_view())
        .ok_or_else(|| AppError::not_found("Task"))
}

pub async fn list(
    conn: &Connection,
    filter: TaskFilter,
    page: PageRequest,
) -> AppResult<Page<TaskView>> {
    let (records, total) = tasks::list(conn, filter, page).await?;
    Ok(Page::new(
        records.iter().map(TaskRecord::to_view).collect(),
        total,
        page,
    ))
}

/// Outcome of filtering a [`TaskUpdate`] through the caller's privileges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecision {
    pub next: TaskRecord,
    /// Submitted fields the caller may not change; left as they were.
    pub dropped: Vec<&'static str>,
}

/// Merge `changes` into `current` as far as `principal` is allowed to.
///
/// `status` is always applied. `title`, `description`, `priority` and
/// `executor_id` need an admin or the task's current executor; for anyone
/// else they are dropped without failing the request.
pub fn apply_update(current: &TaskRecord, changes: TaskUpdate, principal: &Principal) -> FieldDecision {
    let privileged = principal.is_admin() || current.executor_id == Some(principal.user_id);
    let mut next = current.clone();
    let mut dropped = Vec::new();

    if let Some(status) = changes.status {
        next.status = status;
    }

    if privileged {
        if let Some(title) = changes.title {
            next.title = title;
        }
        if let Some(description) = changes.description {
            next.description = Some(description);
        }
        if let Some(priority) = changes.priority {
            next.priority = priority;
        }
        if let Some(executor_id) = changes.executor_id {
            next.executor_id = Some(executor_id);
        }
    } else {
        if changes.title.is_some() {
            dropped.push("title");
        }
        if changes.description.is_some() {
            dropped.push("description");
        }
        if changes.priority.is_some() {
            dropped.push("priority");
        }
        if changes.executor_id.is_some() {
            dropped.push("executor_id");
        }
    }

    FieldDecision { next, dropped }
}

pub async fn update(
    conn: &Connection,
    principal: &Principal,
    task_id: i64,
    changes: TaskUpdate,
) -> AppResult<TaskView> {
    let current = tasks::find_by_id(conn, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task"))?;

    let FieldDecision { mut next, dropped } = apply_update(&current, changes, principal);

    if !dropped.is_empty() {
        warn!(
            "User {} may only change status of task {}; ignored fields: {}",
            principal.user_id,
            task_id,
            dropped.join(", ")
        );
    }

    if next.title != current.title {
        next.title = clean_title(&next.title)?;
    }
    if next.executor_id != current.executor_id {
        if let Some(executor_id) = next.executor_id {
            ensure_user_exists(conn, executor_id).await?;
        }
    }

    let saved = tasks::update(conn, next)
        .await?
        .ok_or_else(|| AppError::not_found("Task"))?;

    info!("Task {} updated by user {}", task_id, principal.user_id);
    Ok(saved.to_view())
}

pub async fn delete(conn: &Connection, task_id: i64) -> AppResult<()> {
    if !tasks::delete(conn, task_id).await? {
        return Err(AppError::not_found("Task"));
    }
    info!("Task {} deleted", task_id);
    Ok(())
}
