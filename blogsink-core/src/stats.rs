//! Cross-cutting statistics, recomputed from the store collections on every
//! call. Nothing here is cached or incrementally maintained; a report is one
//! consistent snapshot of the store it was given.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::store::BlogStore;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_posts: usize,
    pub published_count: usize,
    pub draft_count: usize,
    pub total_users: usize,
    pub admin_count: usize,
    pub total_likes: usize,
    pub total_comments: usize,
    pub total_views: u64,
    pub avg_likes_per_published_post: f64,
    pub top_author: Option<User>,
    pub most_liked_post: Option<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorStats {
    pub total_views: u64,
    pub total_likes: usize,
    pub total_comments: usize,
    pub published_count: usize,
    pub top_post_by_views: Option<Post>,
}

pub fn platform_stats(store: &BlogStore) -> PlatformStats {
    let posts = store.posts();
    let published_count = posts.iter().filter(|post| post.published).count();
    let total_likes: usize = posts.iter().map(Post::likes).sum();
    let avg_likes_per_published_post = if published_count == 0 {
        0.0
    } else {
        total_likes as f64 / published_count as f64
    };

    let mut posts_per_author: HashMap<i64, usize> = HashMap::new();
    for post in posts {
        *posts_per_author.entry(post.author_id).or_default() += 1;
    }
    // Post count descending; the earliest-registered user wins ties.
    let top_author = store
        .user_records()
        .iter()
        .map(|record| &record.user)
        .filter_map(|user| {
            posts_per_author
                .get(&user.id)
                .map(|&count| (count, user))
        })
        .max_by(|(count_a, user_a), (count_b, user_b)| {
            count_a
                .cmp(count_b)
                .then(user_b.created_at.cmp(&user_a.created_at))
                .then(user_b.id.cmp(&user_a.id))
        })
        .map(|(_, user)| user.clone());

    // Like count descending; the most recently created post wins ties.
    let most_liked_post = posts
        .iter()
        .max_by(|a, b| {
            a.likes()
                .cmp(&b.likes())
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        })
        .cloned();

    PlatformStats {
        total_posts: posts.len(),
        published_count,
        draft_count: posts.len() - published_count,
        total_users: store.user_records().len(),
        admin_count: store
            .user_records()
            .iter()
            .filter(|record| record.user.is_admin())
            .count(),
        total_likes,
        total_comments: store.comments().len(),
        total_views: posts.iter().map(|post| post.views).sum(),
        avg_likes_per_published_post,
        top_author,
        most_liked_post,
    }
}

pub fn author_stats(store: &BlogStore, author_id: i64) -> Result<AuthorStats, DomainError> {
    if store.find_user(author_id).is_none() {
        return Err(DomainError::NotFound(format!("user id: {author_id}")));
    }

    let authored: Vec<&Post> = store
        .posts()
        .iter()
        .filter(|post| post.author_id == author_id)
        .collect();
    let authored_ids: Vec<i64> = authored.iter().map(|post| post.id).collect();

    let top_post_by_views = authored
        .iter()
        .max_by(|a, b| {
            a.views
                .cmp(&b.views)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        })
        .map(|post| (*post).clone());

    Ok(AuthorStats {
        total_views: authored.iter().map(|post| post.views).sum(),
        total_likes: authored.iter().map(|post| post.likes()).sum(),
        total_comments: store
            .comments()
            .iter()
            .filter(|comment| authored_ids.contains(&comment.blog_id))
            .count(),
        published_count: authored.iter().filter(|post| post.published).count(),
        top_post_by_views,
    })
}
