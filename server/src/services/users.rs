use shared::types::server_config::AdminSeedConfig;
use shared::types::{Credentials, Page, PageRequest, Role, UserEdit, UserView};
use tokio_rusqlite::Connection;
use tracing::{info, warn};

use crate::auth::Principal;
use crate::database::users::{self, NewUser, UserRecord};
use crate::database::utils::{hash_password, is_unique_violation};
use crate::errors::{AppError, AppResult};
use crate::services::auth::validate_new_credentials;

pub async fn list(conn: &Connection, page: PageRequest) -> AppResult<Page<UserView>> {
    let (records, total) = users::list(conn, page).await?;
    Ok(Page::new(
        records.iter().map(UserRecord::to_view).collect(),
        total,
        page,
    ))
}

pub async fn get(conn: &Connection, user_id: i64) -> AppResult<UserView> {
    users::find_by_id(conn, user_id)
        .await?
        .map(|user| user.to_view())
        .ok_or_else(|| AppError::not_found("User"))
}

/// Replace a user's email, password and role.
pub async fn update(conn: &Connection, user_id: i64, edit: UserEdit) -> AppResult<UserView> {
    let (email, password) = validate_new_credentials(&Credentials {
        email: edit.email,
        password: edit.password,
    })?;
    let password_hash = hash_password(&password)?;

    let changes = NewUser {
        email: email.clone(),
        password_hash,
        role: edit.role,
    };
    let updated = users::update(conn, user_id, changes).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Store(e)
        }
    })?;

    if !updated {
        return Err(AppError::not_found("User"));
    }

    info!("User {} updated (role {})", user_id, edit.role);
    Ok(UserView {
        id: user_id,
        email,
        role: edit.role,
    })
}

/// Remove an account. Admins cannot remove their own.
pub async fn delete(conn: &Connection, principal: &Principal, user_id: i64) -> AppResult<()> {
    if principal.user_id == user_id {
        warn!("User {} tried to delete their own account", user_id);
        return Err(AppError::Forbidden);
    }
    if !users::delete(conn, user_id).await? {
        return Err(AppError::not_found("User"));
    }
    info!("User {} deleted by {}", user_id, principal.user_id);
    Ok(())
}

/// Make sure the configured administrator exists. Returns `true` when the
/// account was created by this call.
pub async fn seed_admin(conn: &Connection, seed: &AdminSeedConfig) -> AppResult<bool> {
    if let Some(existing) = users::find_by_email(conn, seed.email.clone()).await? {
        if existing.role != Role::Admin {
            warn!(
                "Configured admin {} exists with role {}; leaving it unchanged",
                seed.email, existing.role
            );
        }
        return Ok(false);
    }

    let (email, password) = validate_new_credentials(&Credentials {
        email: seed.email.clone(),
        password: seed.password.clone(),
    })?;
    let id = users::insert(
        conn,
        NewUser {
            email: email.clone(),
            password_hash: hash_password(&password)?,
            role: Role::Admin,
        },
    )
    .await?;

    info!("Seeded administrator {} (id {})", email, id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_tables, open};

    async fn setup() -> Connection {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        conn
    }

    fn seed() -> AdminSeedConfig {
        AdminSeedConfig {
            email: "root@x.com".into(),
            password: "rootpassword".into(),
        }
    }

    fn edit(email: &str) -> UserEdit {
        UserEdit {
            email: email.into(),
            password: "newpassword".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn seed_admin_runs_once() {
        let conn = setup().await;
        assert!(seed_admin(&conn, &seed()).await.unwrap());
        assert!(!seed_admin(&conn, &seed()).await.unwrap());

        let admin = users::find_by_email(&conn, "root@x.com".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn self_delete_is_forbidden() {
        let conn = setup().await;
        seed_admin(&conn, &seed()).await.unwrap();
        let admin = users::find_by_email(&conn, "root@x.com".into())
            .await
            .unwrap()
            .unwrap();
        let principal = Principal::from(&admin);

        assert!(matches!(
            delete(&conn, &principal, admin.id).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            delete(&conn, &principal, admin.id + 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_rejects_taken_email() {
        let conn = setup().await;
        seed_admin(&conn, &seed()).await.unwrap();
        let other = users::insert(
            &conn,
            NewUser {
                email: "other@x.com".into(),
                password_hash: "h".into(),
                role: Role::User,
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            update(&conn, other, edit("root@x.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            update(&conn, other + 10, edit("free@x.com")).await,
            Err(AppError::NotFound(_))
        ));

        let view = update(&conn, other, edit("renamed@x.com")).await.unwrap();
        assert_eq!(view.email, "renamed@x.com");
        assert_eq!(get(&conn, other).await.unwrap(), view);
    }

    #[tokio::test]
    async fn list_pages() {
        let conn = setup().await;
        seed_admin(&conn, &seed()).await.unwrap();
        let page = list(&conn, PageRequest::default()).await.unwrap();
        assert_eq!(page.result.len(), 1);
        assert_eq!(page.total_pages, 1);
    }
}
