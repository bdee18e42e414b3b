//! Search, filter, and sort over the post collection.
//!
//! Queries never fail: no match is an empty vec. Only published posts are
//! eligible for search results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::post::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Latest,
    Popular,
}

/// Category filter value meaning "no filter". An empty string behaves the
/// same way.
pub const ALL_CATEGORIES: &str = "all";

/// Case-insensitive substring search over title, excerpt, and tags of
/// published posts, optionally narrowed to one category. An empty query
/// applies the category filter alone.
pub fn search(posts: &[Post], query: &str, category: &str) -> Vec<Post> {
    let needle = query.trim().to_lowercase();
    let category = category.trim();
    let filter_category = !category.is_empty() && !category.eq_ignore_ascii_case(ALL_CATEGORIES);

    posts
        .iter()
        .filter(|post| post.published)
        .filter(|post| !filter_category || post.category.eq_ignore_ascii_case(category))
        .filter(|post| needle.is_empty() || matches_needle(post, &needle))
        .cloned()
        .collect()
}

/// Orders posts by the requested mode. Like-count ties are common with seed
/// data, so `Popular` breaks them by `created_at` explicitly rather than
/// relying on sort stability.
pub fn sort(mut posts: Vec<Post>, mode: SortMode) -> Vec<Post> {
    match mode {
        SortMode::Latest => {
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        }
        SortMode::Popular => {
            posts.sort_by(|a, b| {
                b.likes()
                    .cmp(&a.likes())
                    .then(b.created_at.cmp(&a.created_at))
                    .then(b.id.cmp(&a.id))
            });
        }
    }
    posts
}

/// Distinct category labels currently present across all posts, drafts
/// included. There is no separately maintained taxonomy; this is recomputed
/// per call.
pub fn categories(posts: &[Post]) -> BTreeSet<String> {
    posts.iter().map(|post| post.category.clone()).collect()
}

fn matches_needle(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
        || post.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, Utc};

    use super::{SortMode, categories, search, sort};
    use crate::domain::post::Post;

    fn post(id: i64, title: &str, category: &str, tags: &[&str], published: bool) -> Post {
        let created_at = Utc::now() + Duration::seconds(id);
        Post {
            id,
            title: title.to_string(),
            slug: format!("post-{id:04}"),
            content: "<p>Body.</p>".to_string(),
            excerpt: "An excerpt.".to_string(),
            author_id: 1,
            author_name: "Ada".to_string(),
            author_avatar: None,
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image_url: None,
            created_at,
            updated_at: created_at,
            liked_by: BTreeSet::new(),
            views: 0,
            published,
        }
    }

    fn seeded() -> Vec<Post> {
        vec![
            post(
                1,
                "Getting Started with React and TypeScript",
                "Engineering",
                &["React", "TypeScript"],
                true,
            ),
            post(2, "Patterns in Practice", "Design", &["UX"], true),
            post(3, "Unpublished Notes on React", "Engineering", &["React"], false),
        ]
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let hits = search(&seeded(), "react", "all");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn search_with_wrong_category_returns_empty() {
        let hits = search(&seeded(), "react", "Design");
        assert!(hits.is_empty());
    }

    #[test]
    fn search_matches_tags() {
        let hits = search(&seeded(), "typescript", "");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn empty_query_applies_category_filter_only() {
        let hits = search(&seeded(), "", "Engineering");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let all = search(&seeded(), "", "all");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn drafts_are_never_searchable() {
        let hits = search(&seeded(), "unpublished", "all");
        assert!(hits.is_empty());
    }

    #[test]
    fn latest_sort_orders_by_creation_descending() {
        let sorted = sort(seeded(), SortMode::Latest);
        let ids: Vec<i64> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn popular_sort_breaks_like_ties_by_creation_descending() {
        // All three posts have zero likes; ordering must still be
        // deterministic, newest first.
        let sorted = sort(seeded(), SortMode::Popular);
        let ids: Vec<i64> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn popular_sort_puts_most_liked_first() {
        let mut posts = seeded();
        posts[0].liked_by = [10, 11].into_iter().collect();
        posts[1].liked_by = [10].into_iter().collect();

        let sorted = sort(posts, SortMode::Popular);
        let ids: Vec<i64> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn categories_are_distinct_and_include_drafts() {
        let labels = categories(&seeded());
        let expected: BTreeSet<String> =
            ["Design", "Engineering"].iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, expected);
    }
}
