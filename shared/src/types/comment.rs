use serde::{Deserialize, Serialize};

/// Comment response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub task_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / edit comment request data. The author is always the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentEdit {
    pub content: String,
}
