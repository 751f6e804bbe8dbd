use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use crate::AppState;
use crate::auth::policy::enforce;
use crate::auth::{Policy, Principal, authenticate};
use crate::errors::{AppError, AppResult};
use crate::handlers::http::utils::{
    HttpResponse, PathParams, deliver_serialized_json, error_response,
};
use crate::handlers::http::{admin, auth, comments, tasks};

/// Request bodies are buffered before routing; anything larger is refused.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
//   OpenHandler     — no principal required.  Receives (req, state, params).
//                     Use for: /health, /api/login, /api/register.
//
//   GuardedHandler  — the route's `Policy` has already passed.
//                     Receives (req, state, params, principal).

type HandlerFuture = Pin<Box<dyn Future<Output = AppResult<HttpResponse>> + Send>>;

type OpenHandler = Box<dyn Fn(Request<Bytes>, AppState, PathParams) -> HandlerFuture + Send + Sync>;

type GuardedHandler =
    Box<dyn Fn(Request<Bytes>, AppState, PathParams, Principal) -> HandlerFuture + Send + Sync>;

enum RouteKind {
    Open(OpenHandler),
    Guarded(Policy, GuardedHandler),
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    // ── Open (no principal) ───────────────────────────────────────────────────

    pub fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state, params| {
                Box::pin(handler(req, state, params))
            })),
        });
        self
    }

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    // ── Guarded (principal + policy) ──────────────────────────────────────────
    //
    // The router authenticates, then evaluates `policy` before the handler is
    // called.  Handlers receive the `Principal` and must not re-check access.

    pub fn guarded<F, Fut>(mut self, method: Method, path: &str, policy: Policy, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams, Principal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Guarded(
                policy,
                Box::new(move |req, state, params, principal| {
                    Box::pin(handler(req, state, params, principal))
                }),
            ),
        });
        self
    }

    pub fn get_guarded<F, Fut>(self, path: &str, policy: Policy, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams, Principal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::GET, path, policy, handler)
    }

    pub fn post_guarded<F, Fut>(self, path: &str, policy: Policy, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams, Principal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::POST, path, policy, handler)
    }

    pub fn put_guarded<F, Fut>(self, path: &str, policy: Policy, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams, Principal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::PUT, path, policy, handler)
    }

    pub fn delete_guarded<F, Fut>(self, path: &str, policy: Policy, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, PathParams, Principal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::DELETE, path, policy, handler)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Entry point for hyper: buffer the body, then [`Router::route`].
    pub async fn serve<B>(&self, req: Request<B>, state: AppState) -> Result<HttpResponse, Infallible>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!("Failed to read request body: {}", e);
                return Ok(error_response(&AppError::bad_request(
                    "Request body too large or unreadable",
                )));
            }
        };

        Ok(self.route(Request::from_parts(parts, bytes), state).await)
    }

    /// Authenticate, match, gate and run a handler. Every error becomes a
    /// JSON error response here.
    pub async fn route(&self, req: Request<Bytes>, state: AppState) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = match self.dispatch(req, state).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        };

        info!("{} {} -> {}", method, path, response.status().as_u16());
        response
    }

    async fn dispatch(&self, mut req: Request<Bytes>, state: AppState) -> AppResult<HttpResponse> {
        authenticate(&mut req, &state).await?;

        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for route in &self.routes {
            if route.method != method {
                continue;
            }
            let Some(params) = PathParams::capture(&route.path, &path) else {
                continue;
            };

            return match &route.kind {
                RouteKind::Open(h) => h(req, state, params).await,

                RouteKind::Guarded(policy, h) => {
                    let attached = req.extensions().get::<Principal>().cloned();
                    let principal = enforce(policy, attached.as_ref(), &params, &state.db)
                        .await?
                        .clone();
                    h(req, state, params, principal).await
                }
            };
        }

        Err(AppError::NotFound("Endpoint not found".to_string()))
    }
}

// ---------------------------------------------------------------------------
// API router
//
// Access rules live here, next to the paths they protect.  Ownership checks
// are always paired with the admin role through `Policy::admin_or`.
// ---------------------------------------------------------------------------

pub fn build_api_router() -> Router {
    Router::new()
        // ── Public ────────────────────────────────────────────────────────────
        .get("/health", |_req, _state, _params| async move {
            Ok::<_, AppError>(deliver_serialized_json(
                &json!({"status": "success", "health": "ok"}),
                StatusCode::OK,
            )?)
        })
        .post("/api/register", |req, state, _params| {
            auth::handle_register(req, state)
        })
        .post("/api/login", |req, state, _params| auth::handle_login(req, state))
        // ── Tasks ─────────────────────────────────────────────────────────────
        .get_guarded(
            "/api/tasks",
            Policy::authenticated(),
            tasks::handle_list_tasks,
        )
        .post_guarded("/api/tasks", Policy::admin(), tasks::handle_create_task)
        .get_guarded(
            "/api/tasks/:id",
            Policy::admin_or(Policy::task_member("id")),
            tasks::handle_get_task,
        )
        .put_guarded(
            "/api/tasks/:id",
            Policy::admin_or(Policy::task_member("id")),
            tasks::handle_update_task,
        )
        .delete_guarded("/api/tasks/:id", Policy::admin(), tasks::handle_delete_task)
        // ── Comments ──────────────────────────────────────────────────────────
        .get_guarded(
            "/api/tasks/:task_id/comments",
            Policy::admin_or(Policy::task_member("task_id")),
            comments::handle_list_comments,
        )
        .post_guarded(
            "/api/tasks/:task_id/comments",
            Policy::admin_or(Policy::task_member("task_id")),
            comments::handle_create_comment,
        )
        .get_guarded(
            "/api/tasks/:task_id/comments/:id",
            Policy::admin_or(Policy::task_member("task_id")),
            comments::handle_get_comment,
        )
        .put_guarded(
            "/api/tasks/:task_id/comments/:id",
            Policy::admin_or(Policy::comment_author("id")),
            comments::handle_update_comment,
        )
        .delete_guarded(
            "/api/tasks/:task_id/comments/:id",
            Policy::admin_or(Policy::comment_author("id")),
            comments::handle_delete_comment,
        )
        // ── Users (admin only) ────────────────────────────────────────────────
        .get_guarded("/api/users", Policy::admin(), admin::handle_get_users)
        .get_guarded("/api/users/:id", Policy::admin(), admin::handle_get_user)
        .put_guarded("/api/users/:id", Policy::admin(), admin::handle_update_user)
        .delete_guarded("/api/users/:id", Policy::admin(), admin::handle_delete_user)
}
