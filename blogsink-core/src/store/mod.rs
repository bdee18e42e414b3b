//! The in-memory content store.
//!
//! One `BlogStore` owns all three collections, so cross-collection cascades
//! (post delete, user delete) happen in a single place and are checked up
//! front before any record is touched. Construct it once and pass it by
//! reference; every mutation is visible to the next read of the same store.

mod comments;
mod posts;
mod users;

use serde::{Deserialize, Serialize};

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::storage::Persistence;

pub(crate) const USERS_COLLECTION: &str = "users";
pub(crate) const POSTS_COLLECTION: &str = "posts";
pub(crate) const COMMENTS_COLLECTION: &str = "comments";

/// A directory entry: the public user plus their credential, if any.
/// Social-login accounts carry no password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user: User,
    pub(crate) password_hash: Option<String>,
}

#[derive(Debug, Default)]
pub struct BlogStore {
    pub(crate) users: Vec<UserRecord>,
    pub(crate) posts: Vec<Post>,
    pub(crate) comments: Vec<Comment>,
    next_user_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl BlogStore {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            posts: Vec::new(),
            comments: Vec::new(),
            next_user_id: 1,
            next_post_id: 1,
            next_comment_id: 1,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn user_records(&self) -> &[UserRecord] {
        &self.users
    }

    pub(crate) fn alloc_user_id(&mut self) -> i64 {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id
    }

    pub(crate) fn alloc_post_id(&mut self) -> i64 {
        let id = self.next_post_id;
        self.next_post_id += 1;
        id
    }

    pub(crate) fn alloc_comment_id(&mut self) -> i64 {
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        id
    }

    /// Rebuilds a store from the persistence collaborator. Id counters are
    /// derived from the highest id seen per collection.
    pub fn load_from(persistence: &dyn Persistence) -> Result<Self, DomainError> {
        let users: Vec<UserRecord> = load_collection(persistence, USERS_COLLECTION)?;
        let posts: Vec<Post> = load_collection(persistence, POSTS_COLLECTION)?;
        let comments: Vec<Comment> = load_collection(persistence, COMMENTS_COLLECTION)?;

        let next_user_id = users.iter().map(|r| r.user.id).max().unwrap_or(0) + 1;
        let next_post_id = posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let next_comment_id = comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        Ok(Self {
            users,
            posts,
            comments,
            next_user_id,
            next_post_id,
            next_comment_id,
        })
    }

    pub fn save_to(&self, persistence: &dyn Persistence) -> Result<(), DomainError> {
        save_collection(persistence, USERS_COLLECTION, &self.users)?;
        save_collection(persistence, POSTS_COLLECTION, &self.posts)?;
        save_collection(persistence, COMMENTS_COLLECTION, &self.comments)?;
        Ok(())
    }
}

fn load_collection<T: for<'de> Deserialize<'de>>(
    persistence: &dyn Persistence,
    collection: &str,
) -> Result<Vec<T>, DomainError> {
    persistence
        .load(collection)?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|err| {
                DomainError::Storage(format!("malformed record in '{collection}': {err}"))
            })
        })
        .collect()
}

fn save_collection<T: Serialize>(
    persistence: &dyn Persistence,
    collection: &str,
    records: &[T],
) -> Result<(), DomainError> {
    let values = records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|err| {
                DomainError::Storage(format!("failed to serialize '{collection}': {err}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    persistence.save(collection, &values)
}
