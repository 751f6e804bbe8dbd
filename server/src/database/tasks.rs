use rusqlite::{OptionalExtension, params};
use shared::types::{PageRequest, Priority, Status, TaskFilter, TaskView};
use tokio_rusqlite::{Connection, Result};

use crate::database::utils::{get_timestamp, parse_column};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub author_id: i64,
    pub executor_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TaskRecord {
    pub fn to_view(&self) -> TaskView {
        TaskView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            author_id: self.author_id,
            executor_id: self.executor_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub author_id: i64,
    pub executor_id: Option<i64>,
}

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, author_id, executor_id, created_at, updated_at";

fn map_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_column(row, 3)?,
        priority: parse_column(row, 4)?,
        author_id: row.get(5)?,
        executor_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub async fn find_by_id(conn: &Connection, task_id: i64) -> Result<Option<TaskRecord>> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let task = conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![task_id],
                map_task,
            )
            .optional()?;
        Ok(task)
    })
    .await
}

/// Insert a task in status `NEW` and return the stored row.
pub async fn insert(conn: &Connection, new_task: NewTask) -> Result<TaskRecord> {
    let now = get_timestamp();

    conn.call(move |conn: &mut rusqlite::Connection| {
        conn.execute(
            "INSERT INTO tasks (title, description, status, priority, author_id, executor_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                new_task.title,
                new_task.description,
                Status::New.as_str(),
                new_task.priority.as_str(),
                new_task.author_id,
                new_task.executor_id,
                now,
            ],
        )?;

        Ok(TaskRecord {
            id: conn.last_insert_rowid(),
            title: new_task.title,
            description: new_task.description,
            status: Status::New,
            priority: new_task.priority,
            author_id: new_task.author_id,
            executor_id: new_task.executor_id,
            created_at: now,
            updated_at: now,
        })
    })
    .await
}

/// Write the mutable columns of `task` back and bump `updated_at`.
///
/// `author_id` and `created_at` are deliberately absent from the statement.
pub async fn update(conn: &Connection, task: TaskRecord) -> Result<Option<TaskRecord>> {
    let now = get_timestamp();

    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, status = ?3, priority = ?4, executor_id = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.as_str(),
                task.executor_id,
                now,
                task.id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        Ok(Some(TaskRecord {
            updated_at: now,
            ..task
        }))
    })
    .await
}

pub async fn delete(conn: &Connection, task_id: i64) -> Result<bool> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(rows > 0)
    })
    .await
}

/// One page of tasks matching `filter`, newest first, plus the total count.
pub async fn list(
    conn: &Connection,
    filter: TaskFilter,
    page: PageRequest,
) -> Result<(Vec<TaskRecord>, i64)> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        const WHERE: &str =
            "WHERE (?1 IS NULL OR author_id = ?1) AND (?2 IS NULL OR executor_id = ?2)";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks {}", WHERE),
            params![filter.author_id, filter.executor_id],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks {} ORDER BY id DESC LIMIT ?3 OFFSET ?4",
            TASK_COLUMNS, WHERE
        ))?;
        let tasks = stmt
            .query_map(
                params![
                    filter.author_id,
                    filter.executor_id,
                    page.limit(),
                    page.offset()
                ],
                map_task,
            )?
            .collect::<std::result::Result<Vec<TaskRecord>, rusqlite::Error>>()?;

        Ok((tasks, total))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::users::{self, NewUser};
    use crate::database::{create_tables, open};
    use shared::types::Role;

    async fn setup() -> (Connection, i64, i64) {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        let mut ids = Vec::new();
        for email in ["admin@x.com", "worker@x.com"] {
            ids.push(
                users::insert(
                    &conn,
                    NewUser {
                        email: email.into(),
                        password_hash: "h".into(),
                        role: Role::User,
                    },
                )
                .await
                .unwrap(),
            );
        }
        (conn, ids[0], ids[1])
    }

    fn new_task(author_id: i64, executor_id: Option<i64>) -> NewTask {
        NewTask {
            title: "Write report".into(),
            description: Some("quarterly".into()),
            priority: Priority::Medium,
            author_id,
            executor_id,
        }
    }

    #[tokio::test]
    async fn insert_starts_in_new() {
        let (conn, author, worker) = setup().await;
        let task = insert(&conn, new_task(author, Some(worker))).await.unwrap();
        assert_eq!(task.status, Status::New);

        let stored = find_by_id(&conn, task.id).await.unwrap().unwrap();
        assert_eq!(stored, task);
    }

    #[tokio::test]
    async fn update_leaves_author_alone() {
        let (conn, author, worker) = setup().await;
        let task = insert(&conn, new_task(author, None)).await.unwrap();

        let changed = TaskRecord {
            author_id: worker,
            status: Status::Done,
            executor_id: Some(worker),
            ..task.clone()
        };
        update(&conn, changed).await.unwrap().unwrap();

        let stored = find_by_id(&conn, task.id).await.unwrap().unwrap();
        assert_eq!(stored.author_id, author);
        assert_eq!(stored.status, Status::Done);
        assert_eq!(stored.executor_id, Some(worker));
    }

    #[tokio::test]
    async fn update_missing_task_returns_none() {
        let (conn, author, _) = setup().await;
        let mut task = insert(&conn, new_task(author, None)).await.unwrap();
        task.id += 100;
        assert!(update(&conn, task).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_executor() {
        let (conn, author, worker) = setup().await;
        insert(&conn, new_task(author, Some(worker))).await.unwrap();
        insert(&conn, new_task(author, None)).await.unwrap();
        insert(&conn, new_task(author, Some(worker))).await.unwrap();

        let filter = TaskFilter {
            author_id: None,
            executor_id: Some(worker),
        };
        let (tasks, total) = list(&conn, filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(tasks.iter().all(|t| t.executor_id == Some(worker)));

        let (all, total) = list(&conn, TaskFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn deleting_executor_unassigns_task() {
        let (conn, author, worker) = setup().await;
        let task = insert(&conn, new_task(author, Some(worker))).await.unwrap();
        users::delete(&conn, worker).await.unwrap();

        let stored = find_by_id(&conn, task.id).await.unwrap().unwrap();
        assert_eq!(stored.executor_id, None);
    }
}
