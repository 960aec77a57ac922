use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use blog_portal::{
    AppConfig, AppState, create_router,
    repository::{MemoryRepository, RepositoryState},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// Full-router tests: every request goes through the real routing table,
// extractors, and middleware stack, backed by the in-memory repository so the
// suite needs no running database.

struct TestApp {
    router: axum::Router,
    repo: RepositoryState,
}

fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };
    TestApp {
        router: create_router(state),
        repo,
    }
}

impl TestApp {
    async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> axum::response::Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_json(&self, uri: &str, body: Value, bearer: Option<&str>) -> axum::response::Response {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Registers a user through the wire and returns their identity token.
    async fn register(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/register",
                json!({
                    "username": username,
                    "name": username,
                    "lastname": null,
                    "password": "longenough",
                }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect must carry a Location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app();
    let response = app.get("/health").await;
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_register_login_post_comment_flow() {
    let app = spawn_app();
    let token = app.register("alice").await;

    // Author a post with the issued token.
    let response = app
        .post_json(
            "/new-post",
            json!({"title": "Hello", "content": "<p>first</p>"}),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The home feed now carries it, author name included.
    let home = read_json(app.get("/").await).await;
    assert_eq!(home.as_array().unwrap().len(), 1);
    assert_eq!(home[0]["title"], "Hello");
    assert_eq!(home[0]["author_name"], "alice");

    // Comment on it and read the thread back.
    let response = app
        .post_json("/post/1", json!({"text": "nice"}), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/post/1");

    let page = read_json(app.get("/post/1").await).await;
    assert_eq!(page["post"]["title"], "Hello");
    assert_eq!(page["comments"].as_array().unwrap().len(), 1);
    assert_eq!(page["comments"][0]["content"], "nice");
}

#[tokio::test]
async fn test_register_conflict_over_the_wire() {
    let app = spawn_app();
    app.register("alice").await;

    let response = app
        .post_json(
            "/register",
            json!({
                "username": "alice",
                "name": "Imposter",
                "lastname": null,
                "password": "longenough",
            }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/login?username=alice&flash=account-exists"
    );
}

#[tokio::test]
async fn test_validation_failure_is_422_with_field_errors() {
    let app = spawn_app();
    let response = app
        .post_json(
            "/register",
            json!({
                "username": "bob",
                "name": "Bob",
                "lastname": null,
                "password": "short",
            }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn test_anonymous_delete_link_is_a_silent_redirect() {
    let app = spawn_app();
    let token = app.register("alice").await;
    app.post_json(
        "/new-post",
        json!({"title": "Keep", "content": "body"}),
        Some(&token),
    )
    .await;

    let response = app.get("/delete/1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(app.repo.get_post(1).await.is_some());
}

#[tokio::test]
async fn test_logout_kills_the_session_over_the_wire() {
    let app = spawn_app();
    let token = app.register("alice").await;

    let response = app
        .request(
            Request::get("/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The same token can no longer author anything; the submit bounces home.
    let response = app
        .post_json(
            "/new-post",
            json!({"title": "Late", "content": "body"}),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(app.repo.list_posts().await.is_empty());
}

#[tokio::test]
async fn test_admin_surface_and_user_cascade() {
    let app = spawn_app();
    // First registration takes id 1, the administrator.
    let admin_token = app.register("admin").await;
    let user_token = app.register("mallory").await;

    // Mallory authors a post; the admin comments on it.
    app.post_json(
        "/new-post",
        json!({"title": "Spam", "content": "spam"}),
        Some(&user_token),
    )
    .await;
    app.post_json("/post/1", json!({"text": "reported"}), Some(&admin_token))
        .await;

    // The roster is admin-only.
    let denied = app
        .request(
            Request::get("/admin")
                .header(header::AUTHORIZATION, format!("Bearer {user_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&denied), "/");

    let granted = app
        .request(
            Request::get("/admin")
                .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(granted.status(), StatusCode::OK);
    let roster = read_json(granted).await;
    assert_eq!(roster["users"].as_array().unwrap().len(), 2);

    // Deleting mallory removes her account, her post, and the comment thread.
    let response = app
        .request(
            Request::get("/admin/user/2/delete")
                .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    assert!(app.repo.get_user(2).await.is_none());
    assert!(app.repo.list_posts().await.is_empty());
    assert!(app.repo.get_comment(1).await.is_none());

    // Her token stops resolving with the account gone.
    let response = app
        .post_json(
            "/new-post",
            json!({"title": "Ghost", "content": "boo"}),
            Some(&user_token),
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_local_bypass_header_works_end_to_end() {
    let app = spawn_app();
    app.register("alice").await;

    // In the local environment an x-user-id header stands in for a token.
    let response = app
        .request(
            Request::get("/personal")
                .header("x-user-id", "1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = read_json(response).await;
    assert_eq!(page["user"]["username"], "alice");
}
