use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The abstract contract for all persistence operations, letting handlers work
/// against the data layer without knowing the concrete implementation
/// (Postgres in production, the in-memory map store in tests).
///
/// Contract points the rest of the system relies on:
/// - inserts return `None` when a uniqueness constraint (username, post title)
///   would be violated; the constraint is the sole arbiter under races;
/// - updates return `None` both for a missing row and for a conflicting
///   uniqueness change;
/// - deletes return whether a row was removed, and cascade explicitly:
///   a user takes their posts, comments, and sessions with them, a post takes
///   its comments;
/// - no operation here performs authorization. Ownership is decided by the
///   guard at the handler layer, never inside a query.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// All users ordered by id. Admin listing.
    async fn list_users(&self) -> Vec<User>;
    async fn get_user(&self, id: i64) -> Option<User>;
    async fn get_user_by_username(&self, username: &str) -> Option<User>;
    /// Inserts a user; `None` on username conflict.
    async fn create_user(&self, user: NewUser) -> Option<User>;
    /// Updates username and name fields; `None` if missing or the new
    /// username collides.
    async fn update_user_profile(
        &self,
        id: i64,
        username: &str,
        name: &str,
        lastname: Option<&str>,
    ) -> Option<User>;
    /// Deletes a user and cascades to their posts, comments (both authored and
    /// on their posts), and sessions.
    async fn delete_user(&self, id: i64) -> bool;

    // --- Posts ---
    /// All posts, newest first, enriched with the author's display name.
    async fn list_posts(&self) -> Vec<Post>;
    async fn get_post(&self, id: i64) -> Option<Post>;
    async fn posts_by_author(&self, author_id: i64) -> Vec<Post>;
    /// Inserts a post; `None` on title conflict.
    async fn create_post(&self, post: NewPost) -> Option<Post>;
    /// In-place update of title and content; `None` if missing or the new
    /// title collides.
    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post>;
    /// Deletes a post and cascades to its comments.
    async fn delete_post(&self, id: i64) -> bool;

    // --- Comments ---
    async fn get_comment(&self, id: i64) -> Option<Comment>;
    /// Comments on a post, oldest first, enriched with the author's username.
    async fn comments_for_post(&self, post_id: i64) -> Vec<Comment>;
    async fn create_comment(&self, comment: NewComment) -> Option<Comment>;
    async fn delete_comment(&self, id: i64) -> bool;

    // --- Sessions (the identity-token table) ---
    async fn create_session(&self, token_id: Uuid, user_id: i64) -> bool;
    async fn get_session(&self, token_id: Uuid) -> Option<i64>;
    async fn delete_session(&self, token_id: Uuid) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share persistence access across the application state.
pub type RepositoryState = Arc<dyn Repository>;
