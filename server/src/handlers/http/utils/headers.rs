use hyper::header::{self, HeaderMap, HeaderValue};
use tracing::debug;

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| {
        debug!("Retrieved header: {}", name);
        s.to_string()
    })
}

/// Extract bearer token from Authorization header
/// Format: "Authorization: Bearer <token>"
pub fn get_bearer_token(headers: &HeaderMap) -> Option<String> {
    get_header_value(headers, header::AUTHORIZATION.as_str()).and_then(|auth| {
        match auth.strip_prefix("Bearer ") {
            Some(token) => {
                debug!("Bearer token extracted");
                Some(token.to_string())
            }
            None => {
                debug!("Authorization header without Bearer scheme");
                None
            }
        }
    })
}

/// Add no-cache headers; API responses carry per-user data.
pub fn add_no_cache_headers<T>(mut res: hyper::Response<T>) -> hyper::Response<T> {
    let headers = res.headers_mut();

    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    res
}
