use std::collections::HashMap;

use hyper::Uri;
use shared::types::{PageRequest, TaskFilter};
use shared::types::page::DEFAULT_PAGE_SIZE;

use crate::errors::{AppError, AppResult};

/// Values captured from `:name` segments of the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    /// Match `request_path` against `route_path`, capturing `:param` segments.
    /// Query strings are ignored.
    pub fn capture(route_path: &str, request_path: &str) -> Option<Self> {
        let clean = request_path.split('?').next().unwrap_or(request_path);

        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return None;
        }

        let mut captured = HashMap::new();
        for (r, p) in route_segs.iter().zip(path_segs.iter()) {
            match r.strip_prefix(':') {
                Some(name) if !p.is_empty() => {
                    captured.insert(name.to_string(), p.to_string());
                }
                Some(_) => return None,
                None if r == p => {}
                None => return None,
            }
        }
        Some(Self(captured))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Numeric id captured as `name`; anything else is a 400.
    pub fn id(&self, name: &str) -> AppResult<i64> {
        self.get(name)
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| AppError::bad_request(format!("Invalid {}", name)))
    }
}

/// Decoded `?key=value` pairs. Later duplicates win.
pub fn query_pairs(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn optional_number<T: std::str::FromStr>(
    pairs: &HashMap<String, String>,
    key: &str,
) -> AppResult<Option<T>> {
    match pairs.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("Invalid {} parameter", key))),
    }
}

/// `?page=&size=`; page defaults to 0, size to 50 and is capped.
pub fn page_request(uri: &Uri) -> AppResult<PageRequest> {
    let pairs = query_pairs(uri);
    let page = optional_number::<u32>(&pairs, "page")?.unwrap_or(0);
    let size = optional_number::<u32>(&pairs, "size")?.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(PageRequest::new(page, size))
}

/// `?author_id=&executor_id=` for task listings.
pub fn task_filter(uri: &Uri) -> AppResult<TaskFilter> {
    let pairs = query_pairs(uri);
    Ok(TaskFilter {
        author_id: optional_number(&pairs, "author_id")?,
        executor_id: optional_number(&pairs, "executor_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_named_segments() {
        let params =
            PathParams::capture("/api/tasks/:task_id/comments/:id", "/api/tasks/4/comments/9?x=1")
                .unwrap();
        assert_eq!(params.id("task_id").unwrap(), 4);
        assert_eq!(params.id("id").unwrap(), 9);
    }

    #[test]
    fn capture_rejects_mismatches() {
        assert!(PathParams::capture("/api/tasks/:id", "/api/tasks").is_none());
        assert!(PathParams::capture("/api/tasks/:id", "/api/users/1").is_none());
        assert!(PathParams::capture("/api/tasks/:id", "/api/tasks/").is_none());
        assert!(PathParams::capture("/api/tasks", "/api/tasks").is_some());
    }

    #[test]
    fn non_numeric_id_is_bad_request() {
        let params = PathParams::capture("/api/tasks/:id", "/api/tasks/abc").unwrap();
        assert!(matches!(params.id("id"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn page_and_filter_from_query() {
        let uri: Uri = "/api/tasks?page=2&size=500&executor_id=3".parse().unwrap();
        let page = page_request(&uri).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 100);

        let filter = task_filter(&uri).unwrap();
        assert_eq!(filter.author_id, None);
        assert_eq!(filter.executor_id, Some(3));

        let bad: Uri = "/api/tasks?size=lots".parse().unwrap();
        assert!(page_request(&bad).is_err());

        let plain: Uri = "/api/tasks".parse().unwrap();
        assert_eq!(page_request(&plain).unwrap(), PageRequest::default());
    }
}
