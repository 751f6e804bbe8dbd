use tokio_rusqlite::Connection;

use crate::auth::principal::Principal;
use crate::database::{comments, tasks};
use crate::errors::AppResult;

/// Author or current executor of the task. An absent task has no members.
pub async fn is_task_member(conn: &Connection, principal: &Principal, task_id: i64) -> AppResult<bool> {
    let member = tasks::find_by_id(conn, task_id).await?.is_some_and(|task| {
        task.author_id == principal.user_id || task.executor_id == Some(principal.user_id)
    });
    Ok(member)
}

pub async fn is_comment_author(
    conn: &Connection,
    principal: &Principal,
    comment_id: i64,
) -> AppResult<bool> {
    let author = comments::find_by_id(conn, comment_id)
        .await?
        .is_some_and(|comment| comment.author_id == principal.user_id);
    Ok(author)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tasks::NewTask;
    use crate::database::users::{self, NewUser};
    use crate::database::{create_tables, open};
    use crate::errors::AppError;
    use shared::types::{Priority, Role};

    struct Fixture {
        conn: Connection,
        author: Principal,
        executor: Principal,
        outsider: Principal,
        task_id: i64,
    }

    async fn fixture() -> Fixture {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();

        let mut people = Vec::new();
        for email in ["author@x.com", "exec@x.com", "out@x.com"] {
            let id = users::insert(
                &conn,
                NewUser {
                    email: email.into(),
                    password_hash: "h".into(),
                    role: Role::User,
                },
            )
            .await
            .unwrap();
            people.push(Principal {
                user_id: id,
                subject: email.into(),
                role: Role::User,
            });
        }

        let task = tasks::insert(
            &conn,
            NewTask {
                title: "t".into(),
                description: None,
                priority: Priority::High,
                author_id: people[0].user_id,
                executor_id: Some(people[1].user_id),
            },
        )
        .await
        .unwrap();

        let outsider = people.pop().unwrap();
        let executor = people.pop().unwrap();
        let author = people.pop().unwrap();
        Fixture {
            conn,
            author,
            executor,
            outsider,
            task_id: task.id,
        }
    }

    #[tokio::test]
    async fn author_and_executor_are_members() {
        let f = fixture().await;
        assert!(is_task_member(&f.conn, &f.author, f.task_id).await.unwrap());
        assert!(is_task_member(&f.conn, &f.executor, f.task_id).await.unwrap());
        assert!(!is_task_member(&f.conn, &f.outsider, f.task_id).await.unwrap());
    }

    #[tokio::test]
    async fn absent_task_has_no_members() {
        let f = fixture().await;
        assert!(!is_task_member(&f.conn, &f.author, f.task_id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn only_the_writer_authors_a_comment() {
        let f = fixture().await;
        let comment = comments::insert(&f.conn, f.task_id, f.executor.user_id, "on it".into())
            .await
            .unwrap();

        assert!(is_comment_author(&f.conn, &f.executor, comment.id).await.unwrap());
        assert!(!is_comment_author(&f.conn, &f.author, comment.id).await.unwrap());
        assert!(!is_comment_author(&f.conn, &f.executor, comment.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn storage_failure_is_an_error_not_a_denial() {
        let f = fixture().await;
        f.conn
            .call(|conn| {
                conn.execute_batch("DROP TABLE comments; DROP TABLE tasks;")?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(matches!(
            is_task_member(&f.conn, &f.author, f.task_id).await,
            Err(AppError::Store(_))
        ));
        assert!(matches!(
            is_comment_author(&f.conn, &f.author, 1).await,
            Err(AppError::Store(_))
        ));
    }
}
