use rusqlite::{OptionalExtension, params};
use shared::types::{PageRequest, Role, UserView};
use tokio_rusqlite::{Connection, Result};

use crate::database::utils::{get_timestamp, parse_column};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
}

impl UserRecord {
    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at";

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: parse_column(row, 3)?,
        created_at: row.get(4)?,
    })
}

/// Look a user up by email, which is also the token subject.
pub async fn find_by_email(conn: &Connection, email: String) -> Result<Option<UserRecord>> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email],
                map_user,
            )
            .optional()?;
        Ok(user)
    })
    .await
}

pub async fn find_by_id(conn: &Connection, user_id: i64) -> Result<Option<UserRecord>> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                map_user,
            )
            .optional()?;
        Ok(user)
    })
    .await
}

/// Insert a user and return the new id.  A duplicate email surfaces as a
/// UNIQUE violation (see `utils::is_unique_violation`).
pub async fn insert(conn: &Connection, new_user: NewUser) -> Result<i64> {
    let now = get_timestamp();

    conn.call(move |conn: &mut rusqlite::Connection| {
        conn.execute(
            "INSERT INTO users (email, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_user.email,
                new_user.password_hash,
                new_user.role.as_str(),
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .await
}

/// Replace a user's email, password hash and role.  Returns `false` when no
/// such user exists.
pub async fn update(conn: &Connection, user_id: i64, changes: NewUser) -> Result<bool> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute(
            "UPDATE users SET email = ?1, password_hash = ?2, role = ?3 WHERE id = ?4",
            params![
                changes.email,
                changes.password_hash,
                changes.role.as_str(),
                user_id
            ],
        )?;
        Ok(rows > 0)
    })
    .await
}

pub async fn delete(conn: &Connection, user_id: i64) -> Result<bool> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(rows > 0)
    })
    .await
}

/// One page of users ordered by id, plus the total row count.
pub async fn list(conn: &Connection, page: PageRequest) -> Result<(Vec<UserRecord>, i64)> {
    conn.call(move |conn: &mut rusqlite::Connection| {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id LIMIT ?1 OFFSET ?2",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![page.limit(), page.offset()], map_user)?
            .collect::<std::result::Result<Vec<UserRecord>, rusqlite::Error>>()?;

        Ok((users, total))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_tables, open, utils::is_unique_violation};

    async fn setup() -> Connection {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        conn
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_email() {
        let conn = setup().await;
        let id = insert(&conn, new_user("a@x.com", Role::Admin)).await.unwrap();

        let user = find_by_email(&conn, "a@x.com".into()).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
        assert!(find_by_email(&conn, "b@x.com".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let conn = setup().await;
        insert(&conn, new_user("a@x.com", Role::User)).await.unwrap();
        let err = insert(&conn, new_user("a@x.com", Role::User))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let conn = setup().await;
        assert!(!update(&conn, 99, new_user("z@x.com", Role::User)).await.unwrap());
        assert!(!delete(&conn, 99).await.unwrap());

        let id = insert(&conn, new_user("a@x.com", Role::User)).await.unwrap();
        assert!(update(&conn, id, new_user("c@x.com", Role::Admin)).await.unwrap());
        let user = find_by_id(&conn, id).await.unwrap().unwrap();
        assert_eq!(user.email, "c@x.com");
        assert_eq!(user.role, Role::Admin);
        assert!(delete(&conn, id).await.unwrap());
    }

    #[tokio::test]
    async fn list_pages_through_users() {
        let conn = setup().await;
        for i in 0..5 {
            insert(&conn, new_user(&format!("u{}@x.com", i), Role::User))
                .await
                .unwrap();
        }
        let (users, total) = list(&conn, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "u2@x.com");
    }
}
