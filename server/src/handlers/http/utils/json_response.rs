use std::convert::Infallible;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::types::ErrorResponse;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};
use crate::handlers::http::utils::headers::add_no_cache_headers;

pub type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

fn build(status: StatusCode, json: String) -> Result<HttpResponse> {
    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)).boxed())
        .map_err(|e: http::Error| anyhow!("Failed to build JSON response: {}", e))?;
    Ok(add_no_cache_headers(response))
}

/// Serialize any `Serialize` type and deliver it as a JSON response.
pub fn deliver_serialized_json<T: Serialize>(data: &T, status: StatusCode) -> Result<HttpResponse> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!("Delivering serialized JSON response, size: {} bytes", json.len());

    build(status, json)
}

/// `{"status":"success","data":...}` with the given status code.
pub fn deliver_success_json<T: Serialize>(data: Option<T>, status: StatusCode) -> Result<HttpResponse> {
    let body = match data {
        Some(d) => json!({
            "status": "success",
            "data": d
        }),
        None => json!({
            "status": "success"
        }),
    };

    build(status, body.to_string())
}

/// Delivers a JSON error response with the specified error code, message, and status.
pub fn deliver_error_json(error_code: &str, message: &str, status: StatusCode) -> Result<HttpResponse> {
    debug!(
        "Delivering error JSON: {} - {} ({})",
        status.as_u16(),
        error_code,
        message
    );

    deliver_serialized_json(&ErrorResponse::new(error_code, message), status)
}

/// Render an [`AppError`]. Internal failures are logged in full and sent with
/// a generic message.
pub fn error_response(err: &AppError) -> HttpResponse {
    if err.is_internal() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {} ({})", err.code(), err);
    }

    match deliver_error_json(err.code(), &err.public_message(), err.status()) {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to render error response: {}", e);
            let mut response = Response::new(Full::new(Bytes::new()).boxed());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Parse the buffered request body as JSON; malformed input is a 400.
pub fn read_json<T: DeserializeOwned>(req: &Request<Bytes>) -> AppResult<T> {
    serde_json::from_slice(req.body())
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn error_body_shape() {
        let response = error_response(&AppError::Forbidden);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn success_body_wraps_data() {
        let response = deliver_success_json(Some(json!({"id": 3})), StatusCode::CREATED).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()["cache-control"],
            "no-cache, no-store, must-revalidate"
        );

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["id"], 3);
    }

    #[test]
    fn read_json_rejects_garbage() {
        let req = Request::new(Bytes::from_static(b"{not json"));
        let parsed: AppResult<shared::types::Credentials> = read_json(&req);
        assert!(matches!(parsed, Err(AppError::BadRequest(_))));
    }
}
