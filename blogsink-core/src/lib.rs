//! BlogSink content data layer.
//!
//! Everything lives behind one explicit [`BlogStore`]: the user directory,
//! the post and comment collections, and the cascades between them. Search
//! and sorting ([`query`]) and the dashboard reports ([`stats`]) are pure
//! folds over the store's current state, recomputed per call. Persistence is
//! a pluggable named-collection collaborator ([`storage`]); the store itself
//! performs no I/O and every operation is synchronous.

pub mod auth;
pub mod domain;
pub mod engagement;
pub mod query;
pub mod stats;
pub mod storage;
pub mod store;

pub use auth::{AuthToken, SessionIssuer};
pub use domain::comment::{Comment, CommentThread};
pub use domain::error::DomainError;
pub use domain::post::{Post, PostDraft, PostPatch};
pub use domain::user::{ProfilePatch, RegisterRequest, Role, SocialLoginRequest, User};
pub use query::SortMode;
pub use stats::{AuthorStats, PlatformStats};
pub use storage::{JsonFileStorage, Persistence};
pub use store::{BlogStore, UserRecord};
