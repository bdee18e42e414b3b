use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub blog_id: i64,
    pub author_id: i64,
    /// Snapshot of the author at creation time; never updated retroactively.
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Set only on replies; replies themselves can never be reply targets.
    pub parent_comment_id: Option<i64>,
    pub liked_by: BTreeSet<i64>,
    pub is_edited: bool,
}

impl Comment {
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

/// A top-level comment with its replies in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

pub(crate) fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    if content.len() > 4096 {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be at most 4096 chars",
        });
    }
    Ok(content.to_string())
}
