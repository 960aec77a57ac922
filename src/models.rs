use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. The first-created
/// user (id = 1) is the distinguished administrator; see `guard::ADMIN_ID`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    // Primary key. Sequential; id 1 is reserved for the administrator.
    pub id: i64,
    // Unique login identifier.
    pub username: String,
    pub name: String,
    pub lastname: Option<String>,
    pub reg_date: DateTime<Utc>,
    /// Argon2 hash of the user's secret. Never serialized into a response body.
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password: String,
}

/// Post
///
/// A blog post from the `posts` table. Titles are unique across all posts and
/// every post has exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Post {
    pub id: i64,
    // Unique across all posts; uniqueness is arbitrated by the persistence layer.
    pub title: String,
    // Sanitized HTML. Cleaned through the allow-list before it ever reaches storage.
    pub content: String,
    pub date: DateTime<Utc>,
    // FK to users.id (owner).
    pub author_id: i64,
    // Loaded via a JOIN with `users` for display; absent on bare rows.
    #[sqlx(default)]
    pub author_name: Option<String>,
}

/// Comment
///
/// A comment from the `comments` table. Belongs to exactly one post and one user;
/// deleting either cascades to the comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    // Sanitized HTML, same allow-list as post content.
    pub content: String,
    pub date: DateTime<Utc>,
    pub author_id: i64,
    pub post_id: i64,
    // Loaded via a JOIN with `users` for display; absent on bare rows.
    #[sqlx(default)]
    pub author_username: Option<String>,
}

// --- Insert Payloads (Repository Input) ---

/// NewUser
///
/// Repository insert payload for a user. The password field carries the Argon2
/// hash, never the raw secret.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub lastname: Option<String>,
    pub reg_date: DateTime<Utc>,
    pub password: String,
}

/// NewPost
///
/// Repository insert payload for a post. Content is expected to be sanitized
/// by the handler before it gets here.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub author_id: i64,
}

/// NewComment
///
/// Repository insert payload for a comment.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub content: String,
    pub date: DateTime<Utc>,
    pub author_id: i64,
    pub post_id: i64,
}

// --- View Models (Handler Output) ---

/// AuthResponse
///
/// Returned by login and registration on success. Carries the identity token the
/// client must present as a Bearer header, plus the page the original flow would
/// have redirected to. Cookie mechanics are intentionally left to the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AuthResponse {
    pub token: String,
    pub redirect_to: String,
}

/// PostPage
///
/// View-model for a single post and its comment thread (GET /post/{id}).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostPage {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// UserPage
///
/// Public profile view-model (GET /user?uid=...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserPage {
    pub user: User,
    pub posts: Vec<Post>,
}

/// AdminPage
///
/// Administrator listing of every registered user, ordered by id (GET /admin).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdminPage {
    pub users: Vec<User>,
}

/// PersonalPage
///
/// The authenticated user's own page (GET /personal).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PersonalPage {
    pub user: User,
}

/// PostFormPage
///
/// Pre-fill view-model for the post form. Blank for /new-post, populated with
/// the current values for /edit-post/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostFormPage {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_edit: bool,
}

/// PersonalFormPage
///
/// Pre-fill view-model for the profile form, used both by /personal/edit and by
/// the admin's per-user edit page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PersonalFormPage {
    pub username: String,
    pub name: String,
    pub lastname: Option<String>,
}

/// LoginPage
///
/// View-model for the login form. `username` is pre-filled when a registration
/// attempt was redirected here; `flash` carries the last failure code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginPage {
    pub username: Option<String>,
    pub flash: Option<String>,
}

/// RegisterPage
///
/// View-model for the blank registration form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RegisterPage {
    pub flash: Option<String>,
}
