use tokio_rusqlite::{Connection, Result};
use tracing::info;

/// Open the database at `path`.  `":memory:"` gives a private in-memory
/// database, which is what the tests use.
pub async fn open(path: &str) -> Result<Connection> {
    let conn = if path == ":memory:" {
        Connection::open_in_memory().await?
    } else {
        Connection::open(path).await?
    };
    info!("Opened database: {}", path);
    Ok(conn)
}

/// Initialize the database schema.  Idempotent.
pub async fn create_tables(conn: &Connection) -> Result<()> {
    conn.call(|conn: &mut rusqlite::Connection| {
        // Foreign keys are per-connection in SQLite and the server only ever
        // holds this one.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // `email` is the token subject; its uniqueness is what lets the
        // principal store resolve a subject to exactly one user.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                email         TEXT    NOT NULL UNIQUE,
                password_hash TEXT    NOT NULL,
                role          TEXT    NOT NULL DEFAULT 'USER',
                created_at    INTEGER NOT NULL
            )",
            [],
        )?;

        // author_id is written once at insert and never updated.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT    NOT NULL,
                description TEXT,
                status      TEXT    NOT NULL DEFAULT 'NEW',
                priority    TEXT    NOT NULL,
                author_id   INTEGER NOT NULL,
                executor_id INTEGER,
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL,
                FOREIGN KEY (author_id)   REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (executor_id) REFERENCES users(id) ON DELETE SET NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS comments (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id    INTEGER NOT NULL,
                author_id  INTEGER NOT NULL,
                content    TEXT    NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (task_id)   REFERENCES tasks(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_author ON tasks(author_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_executor ON tasks(executor_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_comments_task ON comments(task_id)",
            [],
        )?;

        Ok(())
    })
    .await?;

    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_tables_is_idempotent() {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        create_tables(&conn).await.unwrap();

        let tables: Vec<String> = conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(tables, vec!["comments", "tasks", "users"]);
    }
}
