use shared::types::Role;
use tokio_rusqlite::Connection;

use crate::database::users::{self, UserRecord};

/// The authenticated caller, attached to the request by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    /// Email; what tokens are issued for.
    pub subject: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            subject: user.email.clone(),
            role: user.role,
        }
    }
}

/// Resolve a token subject to the current state of that user.
///
/// Role and id come from storage, never from the token, so a demoted or
/// deleted user loses access on their next request.
pub async fn resolve(conn: &Connection, subject: &str) -> tokio_rusqlite::Result<Option<Principal>> {
    let user = users::find_by_email(conn, subject.to_string()).await?;
    Ok(user.as_ref().map(Principal::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::users::NewUser;
    use crate::database::{create_tables, open};

    #[tokio::test]
    async fn resolve_reads_role_from_storage() {
        let conn = open(":memory:").await.unwrap();
        create_tables(&conn).await.unwrap();
        let id = users::insert(
            &conn,
            NewUser {
                email: "boss@x.com".into(),
                password_hash: "h".into(),
                role: Role::Admin,
            },
        )
        .await
        .unwrap();

        let principal = resolve(&conn, "boss@x.com").await.unwrap().unwrap();
        assert_eq!(principal.user_id, id);
        assert!(principal.is_admin());

        assert!(resolve(&conn, "nobody@x.com").await.unwrap().is_none());
    }
}
