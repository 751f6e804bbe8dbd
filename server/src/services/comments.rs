use shared::types::{CommentView, Page, PageRequest};
use tokio_rusqlite::Connection;
use tracing::info;

use crate::auth::Principal;
use crate::database::comments::{self, CommentRecord};
use crate::database::tasks;
use crate::database::utils::sanitize_string;
use crate::errors::{AppError, AppResult};

fn clean_content(content: &str) -> AppResult<String> {
    let content = sanitize_string(content);
    if content.is_empty() {
        return Err(AppError::bad_request("Comment cannot be empty"));
    }
    Ok(content)
}

async fn ensure_task_exists(conn: &Connection, task_id: i64) -> AppResult<()> {
    match tasks::find_by_id(conn, task_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Task")),
    }
}

async fn find(conn: &Connection, task_id: i64, comment_id: i64) -> AppResult<CommentRecord> {
    comments::find_in_task(conn, task_id, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))
}

pub async fn list(conn: &Connection, task_id: i64, page: PageRequest) -> AppResult<Page<CommentView>> {
    ensure_task_exists(conn, task_id).await?;
    let (records, total) = comments::list_for_task(conn, task_id, page).await?;
    Ok(Page::new(
        records.iter().map(CommentRecord::to_view).collect(),
        total,
        page,
    ))
}

pub async fn get(conn: &Connection, task_id: i64, comment_id: i64) -> AppResult<CommentView> {
    Ok(find(conn, task_id, comment_id).await?.to_view())
}

/// Post a comment on a task as `principal`.
pub async fn create(
    conn: &Connection,
    principal: &Principal,
    task_id: i64,
    content: &str,
) -> AppResult<CommentView> {
    let content = clean_content(content)?;
    ensure_task_exists(conn, task_id).await?;

    let comment = comments::insert(conn, task_id, principal.user_id, content).await?;
    info!(
        "Comment {} added to task {} by user {}",
        comment.id, task_id, principal.user_id
    );
    Ok(comment.to_view())
}

pub async fn update(
    conn: &Connection,
    task_id: i64,
    comment_id: i64,
    content: &str,
) -> AppResult<CommentView> {
    let content = clean_content(content)?;
    find(conn, task_id, comment_id).await?;

    comments::update_content(conn, comment_id, content)
        .await?
        .map(|comment| comment.to_view())
        .ok_or_else(|| AppError::not_found("Comment"))
}

pub async fn delete(conn: &Connection, task_id: i64, comment_id: i64) -> AppResult<()> {
    find(conn, task_id, comment_id).await?;
    if !comments::delete(conn, comment_id).await? {
        return Err(AppError::not_found("Comment"));
    }
    info!("Comment {} deleted from task {}", comment_id, task_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tasks::NewTask;
    use crate::database::users::{self, NewUser};
    use crate::database::{create_tables, open};
    use shared::types::{Priority, Role};

    async fn setup() -> (Connection, Principal, i64) {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        let id = users::insert(
            &conn,
            NewUser {
                email: "w@x.com".into(),
                password_hash: "h".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        let task = tasks::insert(
            &conn,
            NewTask {
                title: "t".into(),
                description: None,
                priority: Priority::Medium,
                author_id: id,
                executor_id: None,
            },
        )
        .await
        .unwrap();
        let principal = Principal {
            user_id: id,
            subject: "w@x.com".into(),
            role: Role::User,
        };
        (conn, principal, task.id)
    }

    #[tokio::test]
    async fn author_is_the_caller() {
        let (conn, who, task_id) = setup().await;
        let comment = create(&conn, &who, task_id, "  looks good ").await.unwrap();
        assert_eq!(comment.author_id, who.user_id);
        assert_eq!(comment.content, "looks good");
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let (conn, who, task_id) = setup().await;
        assert!(matches!(
            create(&conn, &who, task_id, "   ").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let (conn, who, task_id) = setup().await;
        assert!(matches!(
            create(&conn, &who, task_id + 1, "hi").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            list(&conn, task_id + 1, PageRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn comment_must_belong_to_task() {
        let (conn, who, task_id) = setup().await;
        let comment = create(&conn, &who, task_id, "hi").await.unwrap();

        assert!(matches!(
            update(&conn, task_id + 1, comment.id, "edit").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete(&conn, task_id + 1, comment.id).await,
            Err(AppError::NotFound(_))
        ));

        let edited = update(&conn, task_id, comment.id, "edit").await.unwrap();
        assert_eq!(edited.content, "edit");
        delete(&conn, task_id, comment.id).await.unwrap();
        assert!(matches!(
            get(&conn, task_id, comment.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
