//! End-to-end scenarios across the user directory, content store, comment
//! store, and reports, exercised against one shared `BlogStore`.

use blogsink_core::{
    BlogStore, DomainError, JsonFileStorage, PostDraft, RegisterRequest, SortMode, query, stats,
};

fn register(store: &mut BlogStore, email: &str, name: &str) -> i64 {
    store
        .register(RegisterRequest {
            email: email.to_string(),
            password: "very-secure-password".to_string(),
            name: name.to_string(),
        })
        .expect("user must register")
        .id
}

fn draft(title: &str, category: &str, tags: &[&str], published: bool) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        content: format!("<p>Body of {title}.</p>"),
        excerpt: None,
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        image_url: None,
        published,
    }
}

#[test]
fn draft_then_publish_gate() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let post = store
        .create_post(ada, draft("Draft First", "Engineering", &[], false))
        .expect("draft must be created");
    assert!(!post.published);

    let err = store
        .publish_post(post.id, vec!["x".to_string(), "y".to_string()])
        .expect_err("two tags must be rejected");
    assert!(matches!(err, DomainError::Validation { field: "tags", .. }));

    let published = store
        .publish_post(
            post.id,
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
        )
        .expect("three tags must publish");
    assert!(published.published);
}

#[test]
fn like_unlike_counting_across_users() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let bob = register(&mut store, "bob@example.com", "Bob");
    let cleo = register(&mut store, "cleo@example.com", "Cleo");
    let post = store
        .create_post(ada, draft("Popular", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");

    let after_bob = store.like_post(post.id, bob).expect("bob must like");
    assert_eq!(after_bob.likes(), 1);

    let after_cleo = store.like_post(post.id, cleo).expect("cleo must like");
    assert_eq!(after_cleo.likes(), 2);

    let after_unlike = store.like_post(post.id, bob).expect("bob must unlike");
    assert_eq!(after_unlike.likes(), 1);
    assert!(!after_unlike.liked_by.contains(&bob));
    assert!(after_unlike.liked_by.contains(&cleo));
}

#[test]
fn deleting_a_post_cascades_comments_and_replies() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let bob = register(&mut store, "bob@example.com", "Bob");
    let post = store
        .create_post(ada, draft("Discussed", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");
    let comment = store
        .add_comment(post.id, bob, "interesting")
        .expect("comment must be added");
    store
        .add_reply(comment.id, ada, "thanks")
        .expect("reply must be added");

    assert!(store.delete_post(post.id));
    assert!(store.get_post(post.id).is_none());
    assert!(store.comments().is_empty());

    // Deleting an unknown post is a no-op, not an error.
    assert!(!store.delete_post(post.id));
}

#[test]
fn deleting_a_user_cascades_posts_comments_and_replies() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let bob = register(&mut store, "bob@example.com", "Bob");
    let cleo = register(&mut store, "cleo@example.com", "Cleo");
    let post = store
        .create_post(ada, draft("Doomed", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");
    let comment = store
        .add_comment(post.id, bob, "comment by B")
        .expect("comment must be added");
    store
        .add_reply(comment.id, cleo, "reply by C")
        .expect("reply must be added");
    let unrelated = store
        .create_post(bob, draft("Survivor", "Design", &["a", "b", "c"], true))
        .expect("post must be created");

    store.delete_user(ada).expect("delete must cascade");

    assert!(store.find_user(ada).is_none());
    assert!(store.get_post(post.id).is_none());
    assert!(store.comments().is_empty());
    // Other users' content is untouched.
    assert!(store.get_post(unrelated.id).is_some());
    assert_eq!(store.list_users().len(), 2);
}

#[test]
fn seeded_search_scenarios() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    store
        .create_post(
            ada,
            draft(
                "Getting Started with React and TypeScript",
                "Engineering",
                &["React", "TypeScript", "Web"],
                true,
            ),
        )
        .expect("post must be created");
    store
        .create_post(ada, draft("Color Systems", "Design", &["a", "b", "c"], true))
        .expect("post must be created");

    let hits = query::search(store.posts(), "react", "all");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Getting Started with React and TypeScript");

    let misses = query::search(store.posts(), "react", "Design");
    assert!(misses.is_empty());
}

#[test]
fn popular_sort_is_deterministic_for_tied_likes() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    for title in ["First", "Second", "Third"] {
        store
            .create_post(ada, draft(title, "Engineering", &["a", "b", "c"], true))
            .expect("post must be created");
    }

    let sorted = query::sort(store.list_published(), SortMode::Popular);
    let titles: Vec<&str> = sorted.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);
}

#[test]
fn reports_stay_consistent_after_a_cascade() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let bob = register(&mut store, "bob@example.com", "Bob");
    let post = store
        .create_post(ada, draft("Counted", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");
    store.add_comment(post.id, bob, "counted too").expect("comment must be added");
    store.like_post(post.id, bob).expect("must like");

    let before = stats::platform_stats(&store);
    assert_eq!(before.total_posts, 1);
    assert_eq!(before.total_comments, 1);
    assert_eq!(before.total_likes, 1);

    store.delete_user(ada).expect("delete must cascade");

    let after = stats::platform_stats(&store);
    assert_eq!(after.total_posts, 0);
    assert_eq!(after.total_comments, 0);
    assert_eq!(after.total_likes, 0);
    assert_eq!(after.total_users, 1);
}

#[test]
fn store_round_trips_through_json_file_storage() {
    let dir = tempfile::tempdir().expect("tempdir must be created");
    let storage = JsonFileStorage::new(dir.path());

    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let post = store
        .create_post(ada, draft("Persisted", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");
    store.like_post(post.id, ada).expect("must like");
    store.add_comment(post.id, ada, "note to self").expect("comment must be added");
    store.save_to(&storage).expect("save must succeed");

    let mut reloaded = BlogStore::load_from(&storage).expect("load must succeed");
    assert_eq!(reloaded.list_users().len(), 1);
    assert_eq!(reloaded.posts().len(), 1);
    assert_eq!(reloaded.comments().len(), 1);
    assert_eq!(
        reloaded.get_post(post.id).expect("post must survive").likes(),
        1
    );

    // Credentials survive the round trip.
    reloaded
        .authenticate("ada@example.com", "very-secure-password")
        .expect("reloaded credentials must verify");

    // Id allocation resumes after the highest persisted id.
    let bob = register(&mut reloaded, "bob@example.com", "Bob");
    assert_eq!(bob, ada + 1);
    let next = reloaded
        .create_post(bob, draft("Fresh", "Design", &["a", "b", "c"], true))
        .expect("post must be created");
    assert_eq!(next.id, post.id + 1);
}

#[test]
fn comment_delete_is_author_gated_for_plain_users() {
    let mut store = BlogStore::new();
    let ada = register(&mut store, "ada@example.com", "Ada");
    let bob = register(&mut store, "bob@example.com", "Bob");
    let post = store
        .create_post(ada, draft("Moderated", "Engineering", &["a", "b", "c"], true))
        .expect("post must be created");
    let comment = store
        .add_comment(post.id, bob, "spam")
        .expect("comment must be added");

    let err = store
        .delete_comment(comment.id, ada)
        .expect_err("plain user must not moderate");
    assert!(matches!(err, DomainError::Forbidden));

    assert!(store
        .delete_comment(comment.id, bob)
        .expect("author delete must succeed"));
}
