use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Defines endpoints that act on behalf of a logged-in user: authoring,
/// editing, deleting, commenting, and the personal profile pages.
///
/// There is no rejecting middleware in front of these routes. The `Actor`
/// extractor never fails, and each handler answers an anonymous or
/// unauthorized actor with a silent redirect to a safe page. The response
/// never reveals whether the target resource exists or who owns it.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /logout
        // Invalidates the current session server-side. The same signed token
        // stops resolving afterwards. Always redirects home.
        .route("/logout", get(handlers::logout))
        // GET /new-post and POST /new-post
        // The blank post form and its submit. Content passes the HTML
        // allow-list; a duplicate title redirects back with a flash code.
        .route(
            "/new-post",
            get(handlers::new_post_page).post(handlers::create_post),
        )
        // POST /post/{id}
        // Adds a comment to an existing post. Anonymous actors are redirected
        // to the login page instead.
        .route("/post/{id}", post(handlers::add_comment))
        // GET /edit-post/{id} and POST /edit-post/{id}
        // Pre-filled edit form and its submit. Owner or admin only; anyone
        // else is silently sent to the post view.
        .route(
            "/edit-post/{id}",
            get(handlers::edit_post_page).post(handlers::update_post),
        )
        // GET /personal
        // The actor's own page.
        .route("/personal", get(handlers::personal_page))
        // GET /personal/edit and POST /personal/edit
        // Profile form and its submit. A username collision redirects back
        // with a flash code and changes nothing.
        .route(
            "/personal/edit",
            get(handlers::edit_personal_page).post(handlers::update_personal),
        )
        // GET /delete/{post_id}
        // Deletes a post and its comments, owner or admin only. Unauthorized
        // actors get the identical redirect and nothing is removed.
        .route("/delete/{post_id}", get(handlers::delete_post))
        // GET /delete/post/{post_id}/comment/{comment_id}
        // Deletes a comment, author or admin only, then returns to the thread.
        .route(
            "/delete/post/{post_id}/comment/{comment_id}",
            get(handlers::delete_comment),
        )
}
