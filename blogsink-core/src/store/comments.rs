//! Comment Store operations. Threading is one level deep: a comment either
//! sits directly on a post or replies to a top-level comment.

use chrono::Utc;
use tracing::debug;

use super::BlogStore;
use crate::domain::comment::{Comment, CommentThread, normalize_comment_content};
use crate::domain::error::DomainError;
use crate::engagement;

impl BlogStore {
    pub fn add_comment(
        &mut self,
        blog_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Comment, DomainError> {
        if self.get_post(blog_id).is_none() {
            return Err(DomainError::NotFound(format!("post id: {blog_id}")));
        }
        self.insert_comment(blog_id, author_id, content, None)
    }

    pub fn add_reply(
        &mut self,
        parent_comment_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let parent = self
            .comments
            .iter()
            .find(|comment| comment.id == parent_comment_id)
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {parent_comment_id}")))?;
        if parent.is_reply() {
            return Err(DomainError::Validation {
                field: "parent_comment_id",
                message: "replies cannot be nested",
            });
        }
        let blog_id = parent.blog_id;
        self.insert_comment(blog_id, author_id, content, Some(parent_comment_id))
    }

    pub fn edit_comment(
        &mut self,
        id: i64,
        new_content: &str,
        requester_id: i64,
    ) -> Result<Comment, DomainError> {
        let content = normalize_comment_content(new_content)?;
        let comment = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        if comment.author_id != requester_id {
            return Err(DomainError::Forbidden);
        }
        comment.content = content;
        comment.is_edited = true;
        Ok(comment.clone())
    }

    /// Author-or-admin delete; removing a top-level comment takes its replies
    /// with it. An unknown id is reported as `Ok(false)`, not an error.
    pub fn delete_comment(&mut self, id: i64, requester_id: i64) -> Result<bool, DomainError> {
        let Some(index) = self.comments.iter().position(|comment| comment.id == id) else {
            return Ok(false);
        };

        let is_author = self.comments[index].author_id == requester_id;
        let is_admin = self
            .find_user(requester_id)
            .is_some_and(|user| user.is_admin());
        if !is_author && !is_admin {
            return Err(DomainError::Forbidden);
        }

        self.comments.remove(index);
        self.comments
            .retain(|comment| comment.parent_comment_id != Some(id));
        debug!(comment_id = id, requester_id, "deleted comment");
        Ok(true)
    }

    pub fn like_comment(&mut self, id: i64, user_id: i64) -> Result<Comment, DomainError> {
        if self.find_user(user_id).is_none() {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        let comment = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;

        let liked = engagement::toggle(&mut comment.liked_by, user_id);
        debug!(comment_id = id, user_id, liked, "toggled comment like");
        Ok(comment.clone())
    }

    /// Top-level comments newest-first, each carrying its replies in
    /// creation order.
    pub fn list_for_blog(&self, blog_id: i64) -> Vec<CommentThread> {
        let mut threads: Vec<CommentThread> = self
            .comments
            .iter()
            .filter(|comment| comment.blog_id == blog_id && !comment.is_reply())
            .map(|comment| {
                let mut replies: Vec<Comment> = self
                    .comments
                    .iter()
                    .filter(|reply| reply.parent_comment_id == Some(comment.id))
                    .cloned()
                    .collect();
                replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                CommentThread {
                    comment: comment.clone(),
                    replies,
                }
            })
            .collect();
        threads.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then(b.comment.id.cmp(&a.comment.id))
        });
        threads
    }

    fn insert_comment(
        &mut self,
        blog_id: i64,
        author_id: i64,
        content: &str,
        parent_comment_id: Option<i64>,
    ) -> Result<Comment, DomainError> {
        let content = normalize_comment_content(content)?;
        let author = self
            .find_user(author_id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {author_id}")))?
            .clone();

        let comment = Comment {
            id: self.alloc_comment_id(),
            blog_id,
            author_id,
            author_name: author.name,
            author_avatar: author.avatar,
            content,
            created_at: Utc::now(),
            parent_comment_id,
            liked_by: Default::default(),
            is_edited: false,
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }
}
