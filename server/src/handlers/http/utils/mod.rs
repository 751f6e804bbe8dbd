pub mod headers;
pub mod json_response;
pub mod params;

pub use json_response::{
    HttpResponse, deliver_error_json, deliver_serialized_json, deliver_success_json,
    error_response, read_json,
};
pub use params::{PathParams, page_request, task_filter};
