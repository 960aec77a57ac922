use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Defines endpoints restricted to the administrator account (the fixed first
/// user, id 1). Nested under `/admin` by the top-level router; every handler
/// re-checks the admin privilege itself and silently redirects anyone else
/// home.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // The user roster, ordered by id.
        .route("/", get(handlers::admin_page))
        // GET /admin/user/{id} and POST /admin/user/{id}
        // Pre-filled profile form for any user and its submit. The username
        // stays uniqueness-checked even for the administrator.
        .route(
            "/user/{id}",
            get(handlers::edit_user_page).post(handlers::update_user),
        )
        // GET /admin/user/{id}/delete
        // Removes a user and everything they own: posts, comments both
        // authored and received, and live sessions.
        .route("/user/{id}/delete", get(handlers::delete_user))
}
