use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the post feed, post and profile views, and the
/// identity gateway (register and login).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The home feed: every post, newest first, each enriched with the
        // author's display name.
        .route("/", get(handlers::home))
        // GET /register and POST /register
        // The registration form and its submit. A taken username redirects to
        // /login carrying the attempted name; success logs the new user in.
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register),
        )
        // GET /login and POST /login
        // The login form and its submit. Unknown-account and wrong-password
        // failures redirect back with distinct flash codes.
        .route("/login", get(handlers::login_page).post(handlers::login))
        // GET /post/{id}
        // A single post with its full comment thread. 404 when missing.
        // POST on the same path adds a comment; that submit requires a
        // logged-in actor and is registered in the authenticated module.
        .route("/post/{id}", get(handlers::show_post))
        // GET /user?uid=...
        // A user's public profile and their posts. A missing or non-decimal
        // uid redirects home rather than erroring.
        .route("/user", get(handlers::view_user))
}
