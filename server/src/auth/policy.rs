//! Per-route access rules.
//!
//! A [`Policy`] is attached to a route when the router is built and checked
//! against the request's principal and path parameters before the handler
//! runs.

use std::future::Future;
use std::pin::Pin;

use shared::types::Role;
use tokio_rusqlite::Connection;
use tracing::warn;

use crate::auth::ownership::{is_comment_author, is_task_member};
use crate::auth::principal::Principal;
use crate::errors::{AppError, AppResult};
use crate::handlers::http::utils::params::PathParams;

type Decision<'a> = Pin<Box<dyn Future<Output = AppResult<bool>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Any signed-in user.
    Authenticated,
    Role(Role),
    /// Member of the task whose id is in the named path parameter.
    TaskMember(&'static str),
    /// Author of the comment whose id is in the named path parameter.
    CommentAuthor(&'static str),
    /// First passing branch wins; later branches are not evaluated.
    Any(Vec<Policy>),
}

impl Policy {
    pub fn authenticated() -> Self {
        Self::Authenticated
    }

    pub fn role(role: Role) -> Self {
        Self::Role(role)
    }

    pub fn admin() -> Self {
        Self::Role(Role::Admin)
    }

    pub fn task_member(param: &'static str) -> Self {
        Self::TaskMember(param)
    }

    pub fn comment_author(param: &'static str) -> Self {
        Self::CommentAuthor(param)
    }

    pub fn any(branches: impl IntoIterator<Item = Policy>) -> Self {
        Self::Any(branches.into_iter().collect())
    }

    /// `ADMIN or <ownership>`; the role check goes first so admins never
    /// touch storage here.
    pub fn admin_or(ownership: Policy) -> Self {
        Self::any([Self::admin(), ownership])
    }

    pub fn evaluate<'a>(
        &'a self,
        principal: &'a Principal,
        params: &'a PathParams,
        db: &'a Connection,
    ) -> Decision<'a> {
        Box::pin(async move {
            match self {
                Self::Authenticated => Ok(true),
                Self::Role(role) => Ok(principal.role == *role),
                Self::TaskMember(param) => {
                    is_task_member(db, principal, params.id(param)?).await
                }
                Self::CommentAuthor(param) => {
                    is_comment_author(db, principal, params.id(param)?).await
                }
                Self::Any(branches) => {
                    for branch in branches {
                        if branch.evaluate(principal, params, db).await? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            }
        })
    }
}

/// Gate a guarded route: no principal is 401, a failed policy is 403.
pub async fn enforce<'p>(
    policy: &Policy,
    principal: Option<&'p Principal>,
    params: &PathParams,
    db: &Connection,
) -> AppResult<&'p Principal> {
    let principal = principal.ok_or(AppError::Unauthenticated)?;

    if policy.evaluate(principal, params, db).await? {
        Ok(principal)
    } else {
        warn!(
            "Policy {:?} denied user {} (params {:?})",
            policy, principal.user_id, params
        );
        Err(AppError::Forbidden)
    }
}
