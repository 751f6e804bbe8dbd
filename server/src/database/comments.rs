use rusqlite::{OptionalExtension, params};
use shared::types::{CommentView, PageRequest};
use tokio_rusqlite::{Connection, Result};

use crate::database::utils::get_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: i64,
    pub task_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CommentRecord {
    pub fn to_view(&self) -> CommentView {
        CommentView {
            id: self.id,
            task_id: self.task_id,
            author_id: self.author_id,
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const COMMENT_COLUMNS: &str = "id, task_id, author_id, content, created_at, updated_at";

fn map_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        task_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub async fn find_by_id(conn: &Connection, comment_id: i64) -> Result<Option<CommentRecord>> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let comment = conn
            .query_row(
                &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
                params![comment_id],
                map_comment,
            )
            .optional()?;
        Ok(comment)
    })
    .await
}

/// Like `find_by_id`, but only matches when the comment hangs off `task_id`.
pub async fn find_in_task(
    conn: &Connection,
    task_id: i64,
    comment_id: i64,
) -> Result<Option<CommentRecord>> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let comment = conn
            .query_row(
                &format!(
                    "SELECT {} FROM comments WHERE id = ?1 AND task_id = ?2",
                    COMMENT_COLUMNS
                ),
                params![comment_id, task_id],
                map_comment,
            )
            .optional()?;
        Ok(comment)
    })
    .await
}

pub async fn insert(
    conn: &Connection,
    task_id: i64,
    author_id: i64,
    content: String,
) -> Result<CommentRecord> {
    let now = get_timestamp();

    conn.call(move |conn: &mut rusqlite::Connection| {
        conn.execute(
            "INSERT INTO comments (task_id, author_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![task_id, author_id, content, now],
        )?;

        Ok(CommentRecord {
            id: conn.last_insert_rowid(),
            task_id,
            author_id,
            content,
            created_at: now,
            updated_at: now,
        })
    })
    .await
}

/// Replace the text of a comment.  Author and task never change.
pub async fn update_content(
    conn: &Connection,
    comment_id: i64,
    content: String,
) -> Result<Option<CommentRecord>> {
    let now = get_timestamp();

    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute(
            "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![content, now, comment_id],
        )?;
        if rows == 0 {
            return Ok(None);
        }

        let comment = conn.query_row(
            &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
            params![comment_id],
            map_comment,
        )?;
        Ok(Some(comment))
    })
    .await
}

pub async fn delete(conn: &Connection, comment_id: i64) -> Result<bool> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute("DELETE FROM comments WHERE id = ?1", params![comment_id])?;
        Ok(rows > 0)
    })
    .await
}

/// Comments on a task, oldest first.
pub async fn list_for_task(
    conn: &Connection,
    task_id: i64,
    page: PageRequest,
) -> Result<(Vec<CommentRecord>, i64)> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments WHERE task_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            COMMENT_COLUMNS
        ))?;
        let comments = stmt
            .query_map(params![task_id, page.limit(), page.offset()], map_comment)?
            .collect::<std::result::Result<Vec<CommentRecord>, rusqlite::Error>>()?;

        Ok((comments, total))
    })
    .await
}
