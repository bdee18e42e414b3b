//! Content Store operations.

use chrono::Utc;
use tracing::{debug, info};

use super::BlogStore;
use crate::domain::error::DomainError;
use crate::domain::post::{
    Post, PostDraft, PostPatch, derive_excerpt, normalize_tags, slugify, validate_publish_tags,
};
use crate::engagement;

impl BlogStore {
    pub fn create_post(&mut self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let draft = draft.validate()?;
        let author = self
            .find_user(author_id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {author_id}")))?
            .clone();

        let id = self.alloc_post_id();
        let now = Utc::now();
        let post = Post {
            id,
            slug: slugify(&draft.title, id),
            excerpt: derive_excerpt(&draft.content, draft.excerpt),
            title: draft.title,
            content: draft.content,
            author_id,
            author_name: author.name,
            author_avatar: author.avatar,
            category: draft.category,
            tags: draft.tags,
            image_url: draft.image_url,
            created_at: now,
            updated_at: now,
            liked_by: Default::default(),
            views: 0,
            published: draft.published,
        };
        info!(post_id = id, author_id, published = post.published, "created post");
        self.posts.push(post.clone());
        Ok(post)
    }

    pub fn update_post(&mut self, id: i64, patch: PostPatch) -> Result<Post, DomainError> {
        let patch = patch.validate()?;
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        if let Some(title) = patch.title {
            // The slug follows the title; the id stays the identity.
            post.slug = slugify(&title, post.id);
            post.title = title;
        }
        if let Some(content) = patch.content {
            if patch.excerpt.is_none() {
                post.excerpt = derive_excerpt(&content, None);
            }
            post.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(tags) = patch.tags {
            post.tags = tags;
        }
        if let Some(image_url) = patch.image_url {
            post.image_url = Some(image_url);
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    /// The 3..7 tag window is enforced here, at the publish transition, not
    /// retroactively on drafts.
    pub fn publish_post(&mut self, id: i64, tags: Vec<String>) -> Result<Post, DomainError> {
        let tags = normalize_tags(tags);
        validate_publish_tags(&tags)?;

        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        post.tags = tags;
        post.published = true;
        post.updated_at = Utc::now();
        info!(post_id = id, "published post");
        Ok(post.clone())
    }

    /// Removes the post and every comment referencing it. Returns `false`
    /// when the id is unknown; the caller decides whether that is an error.
    pub fn delete_post(&mut self, id: i64) -> bool {
        let Some(index) = self.posts.iter().position(|post| post.id == id) else {
            return false;
        };
        self.posts.remove(index);
        self.comments.retain(|comment| comment.blog_id != id);
        debug!(post_id = id, "deleted post");
        true
    }

    pub fn like_post(&mut self, id: i64, user_id: i64) -> Result<Post, DomainError> {
        if self.find_user(user_id).is_none() {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        let liked = engagement::toggle(&mut post.liked_by, user_id);
        debug!(post_id = id, user_id, liked, "toggled post like");
        Ok(post.clone())
    }

    pub fn record_view(&mut self, id: i64) -> Result<Post, DomainError> {
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        post.views += 1;
        Ok(post.clone())
    }

    pub fn get_post(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn find_post_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    /// The canonical feed ordering: published posts, newest first.
    pub fn list_published(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|post| post.published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    pub fn list_by_author(&self, author_id: i64) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect()
    }
}
