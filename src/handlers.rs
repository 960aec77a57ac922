use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    AppState, auth,
    auth::Actor,
    credentials,
    error::AppError,
    forms::{CommentForm, LoginForm, PersonalForm, PostForm, RegisterForm},
    guard,
    models::{
        AdminPage, AuthResponse, LoginPage, NewComment, NewPost, NewUser, PersonalFormPage,
        PersonalPage, Post, PostFormPage, PostPage, RegisterPage, UserPage,
    },
    sanitize::clean_html,
};

// --- Flash Codes ---
//
// Conflict and login failures are answered with a redirect whose query string
// carries one of these codes; the client renders the matching message. The two
// login failure codes are deliberately distinct.
pub const FLASH_ACCOUNT_EXISTS: &str = "account-exists";
pub const FLASH_UNKNOWN_ACCOUNT: &str = "unknown-account";
pub const FLASH_WRONG_PASSWORD: &str = "wrong-password";
pub const FLASH_LOGIN_TO_COMMENT: &str = "login-to-comment";
pub const FLASH_TITLE_TAKEN: &str = "title-taken";
pub const FLASH_USERNAME_TAKEN: &str = "username-taken";

// --- Query Structs ---

/// Accepted query parameters for the login page: `username` is pre-filled when
/// a registration conflict redirected here, `flash` echoes the last failure.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginPageQuery {
    pub username: Option<String>,
    pub flash: Option<String>,
}

/// Accepted query parameters for the public profile page (GET /user?uid=...).
/// `uid` stays a string so a non-decimal value can redirect instead of 400.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserQuery {
    pub uid: Option<String>,
}

// --- Public Handlers ---

/// home
///
/// [Public Route] Lists every post, newest first.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn home(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.repo.list_posts().await)
}

/// register_page
///
/// [Public Route] The blank registration form view-model.
#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Registration form", body = RegisterPage))
)]
pub async fn register_page() -> Json<RegisterPage> {
    Json(RegisterPage::default())
}

/// register
///
/// [Public Route] Creates a user account. A taken username redirects to the
/// login page carrying the attempted name, with nothing created; success hashes
/// the secret, stores the user, and logs them straight in.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Registered and logged in", body = AuthResponse),
        (status = 303, description = "Username already registered"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    let conflict = || {
        Redirect::to(&format!(
            "/login?username={}&flash={FLASH_ACCOUNT_EXISTS}",
            form.username
        ))
        .into_response()
    };

    if state
        .repo
        .get_user_by_username(&form.username)
        .await
        .is_some()
    {
        return Ok(conflict());
    }

    let Some(password) = credentials::hash_password(&form.password) else {
        return Err(AppError::Internal);
    };

    let new_user = NewUser {
        username: form.username.clone(),
        name: form.name.clone(),
        lastname: form.lastname.clone(),
        reg_date: Utc::now(),
        password,
    };

    // The uniqueness constraint is the arbiter if two registrations race past
    // the pre-check above.
    let Some(user) = state.repo.create_user(new_user).await else {
        return Ok(conflict());
    };

    let Some(token) = auth::login(&state.repo, &state.config, &user).await else {
        return Err(AppError::Internal);
    };

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            redirect_to: "/personal".to_string(),
        }),
    )
        .into_response())
}

/// login_page
///
/// [Public Route] The login form view-model, echoing any pre-filled username
/// and flash code from the query string.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses((status = 200, description = "Login form", body = LoginPage))
)]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        username: query.username,
        flash: query.flash,
    })
}

/// login
///
/// [Public Route] Authenticates a user. Unknown usernames and wrong passwords
/// produce observably distinct flash codes, as the original flow did.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 303, description = "Unknown account or wrong password"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    let Some(user) = state.repo.get_user_by_username(&form.username).await else {
        return Ok(Redirect::to(&format!("/login?flash={FLASH_UNKNOWN_ACCOUNT}")).into_response());
    };

    if !credentials::verify_password(&form.password, &user.password) {
        return Ok(Redirect::to(&format!("/login?flash={FLASH_WRONG_PASSWORD}")).into_response());
    }

    let Some(token) = auth::login(&state.repo, &state.config, &user).await else {
        return Err(AppError::Internal);
    };

    Ok(Json(AuthResponse {
        token,
        redirect_to: "/".to_string(),
    })
    .into_response())
}

/// show_post
///
/// [Public Route] A single post with its comment thread.
#[utoipa::path(
    get,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = PostPage),
        (status = 404, description = "No such post")
    )
)]
pub async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostPage>, AppError> {
    let post = state.repo.get_post(id).await.ok_or(AppError::NotFound)?;
    let comments = state.repo.comments_for_post(id).await;
    Ok(Json(PostPage { post, comments }))
}

/// view_user
///
/// [Public Route] A user's public profile, resolved from the `uid` query
/// parameter. A missing or non-decimal uid redirects home; an unknown id 404s.
#[utoipa::path(
    get,
    path = "/user",
    params(UserQuery),
    responses(
        (status = 200, description = "User profile", body = UserPage),
        (status = 303, description = "Missing or malformed uid"),
        (status = 404, description = "No such user")
    )
)]
pub async fn view_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Response, AppError> {
    let Some(uid) = query.uid.as_deref().and_then(|s| s.parse::<i64>().ok()) else {
        return Ok(Redirect::to("/").into_response());
    };

    let user = state.repo.get_user(uid).await.ok_or(AppError::NotFound)?;
    let posts = state.repo.posts_by_author(uid).await;
    Ok(Json(UserPage { user, posts }).into_response())
}

// --- Authenticated Handlers ---
//
// Authorization is checked explicitly, handler by handler. A failed check is a
// silent redirect to a safe page, never an error: the response does not reveal
// whether the resource exists or who owns it beyond the redirect target.

/// logout
///
/// [Authenticated Route] Invalidates the current session. Anonymous requests
/// end up at the same place without side effects.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Session ended, redirected home"))
)]
pub async fn logout(actor: Actor, State(state): State<AppState>) -> Redirect {
    if let Actor::Authenticated(identity) = &actor {
        auth::logout(&state.repo, identity).await;
    }
    Redirect::to("/")
}

/// new_post_page
///
/// [Authenticated Route] The blank post form. Anonymous actors are redirected
/// home.
#[utoipa::path(
    get,
    path = "/new-post",
    responses(
        (status = 200, description = "Blank post form", body = PostFormPage),
        (status = 303, description = "Authentication required")
    )
)]
pub async fn new_post_page(actor: Actor) -> Response {
    if !actor.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    Json(PostFormPage::default()).into_response()
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the current actor, stamped
/// with the current time. Content passes through the HTML allow-list first.
/// A duplicate title redirects back to the form with a flash code.
#[utoipa::path(
    post,
    path = "/new-post",
    request_body = PostForm,
    responses(
        (status = 303, description = "Created (redirect home), auth required, or title conflict"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn create_post(
    actor: Actor,
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Result<Response, AppError> {
    let Some(author_id) = actor.id() else {
        return Ok(Redirect::to("/").into_response());
    };

    form.validate()?;

    let new_post = NewPost {
        title: form.title.clone(),
        content: clean_html(&form.content),
        date: Utc::now(),
        author_id,
    };

    if state.repo.create_post(new_post).await.is_none() {
        return Ok(Redirect::to(&format!("/new-post?flash={FLASH_TITLE_TAKEN}")).into_response());
    }

    Ok(Redirect::to("/").into_response())
}

/// add_comment
///
/// [Public POST, auth to act] Comments on a post. The post must exist (404
/// otherwise); anonymous actors are invited to log in first.
#[utoipa::path(
    post,
    path = "/post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CommentForm,
    responses(
        (status = 303, description = "Comment added (redirect to post) or login required"),
        (status = 404, description = "No such post"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn add_comment(
    actor: Actor,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(form): Json<CommentForm>,
) -> Result<Response, AppError> {
    let post = state
        .repo
        .get_post(post_id)
        .await
        .ok_or(AppError::NotFound)?;

    if !guard::can_comment(&actor) {
        return Ok(
            Redirect::to(&format!("/login?flash={FLASH_LOGIN_TO_COMMENT}")).into_response(),
        );
    }

    form.validate()?;

    // can_comment passed, so the id is present.
    let author_id = actor.id().ok_or(AppError::Internal)?;

    let new_comment = NewComment {
        content: clean_html(&form.text),
        date: Utc::now(),
        author_id,
        post_id: post.id,
    };

    if state.repo.create_comment(new_comment).await.is_none() {
        return Err(AppError::Internal);
    }

    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

/// edit_post_page
///
/// [Authenticated Route] The post form pre-filled with the current values.
/// Anonymous actors go home; a non-owner (non-admin) is silently sent to the
/// post view instead, exactly like the submit route.
#[utoipa::path(
    get,
    path = "/edit-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Pre-filled post form", body = PostFormPage),
        (status = 303, description = "Auth required or not the owner"),
        (status = 404, description = "No such post")
    )
)]
pub async fn edit_post_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let post = state.repo.get_post(id).await.ok_or(AppError::NotFound)?;

    if !guard::can_edit_post(&actor, &post) {
        return Ok(Redirect::to(&format!("/post/{}", post.id)).into_response());
    }

    Ok(Json(PostFormPage {
        title: Some(post.title),
        content: Some(post.content),
        is_edit: true,
    })
    .into_response())
}

/// update_post
///
/// [Authenticated Route] In-place edit of a post, owner or admin only. Content
/// is re-sanitized; a title collision redirects back to the form.
#[utoipa::path(
    post,
    path = "/edit-post/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostForm,
    responses(
        (status = 303, description = "Updated (redirect to post), denied, or title conflict"),
        (status = 404, description = "No such post"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn update_post(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<PostForm>,
) -> Result<Response, AppError> {
    if !actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let post = state.repo.get_post(id).await.ok_or(AppError::NotFound)?;

    if !guard::can_edit_post(&actor, &post) {
        return Ok(Redirect::to(&format!("/post/{}", post.id)).into_response());
    }

    form.validate()?;

    let content = clean_html(&form.content);
    if state
        .repo
        .update_post(post.id, &form.title, &content)
        .await
        .is_none()
    {
        // The post existed a moment ago; a None here is a title conflict.
        return Ok(Redirect::to(&format!(
            "/edit-post/{}?flash={FLASH_TITLE_TAKEN}",
            post.id
        ))
        .into_response());
    }

    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

/// personal_page
///
/// [Authenticated Route] The actor's own page.
#[utoipa::path(
    get,
    path = "/personal",
    responses(
        (status = 200, description = "Personal page", body = PersonalPage),
        (status = 303, description = "Authentication required")
    )
)]
pub async fn personal_page(actor: Actor) -> Response {
    match actor.user() {
        Some(user) => Json(PersonalPage { user: user.clone() }).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// edit_personal_page
///
/// [Authenticated Route] Profile form pre-filled with the actor's current data.
#[utoipa::path(
    get,
    path = "/personal/edit",
    responses(
        (status = 200, description = "Pre-filled profile form", body = PersonalFormPage),
        (status = 303, description = "Authentication required")
    )
)]
pub async fn edit_personal_page(actor: Actor) -> Response {
    match actor.user() {
        Some(user) => Json(PersonalFormPage {
            username: user.username.clone(),
            name: user.name.clone(),
            lastname: user.lastname.clone(),
        })
        .into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// update_personal
///
/// [Authenticated Route] Updates the actor's own profile. Changing the username
/// is uniqueness-checked; a collision redirects back with a flash code and
/// mutates nothing.
#[utoipa::path(
    post,
    path = "/personal/edit",
    request_body = PersonalForm,
    responses(
        (status = 303, description = "Saved (redirect to personal), denied, or username conflict"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn update_personal(
    actor: Actor,
    State(state): State<AppState>,
    Json(form): Json<PersonalForm>,
) -> Result<Response, AppError> {
    let Some(user) = actor.user() else {
        return Ok(Redirect::to("/").into_response());
    };

    form.validate()?;

    let conflict =
        || Redirect::to(&format!("/personal/edit?flash={FLASH_USERNAME_TAKEN}")).into_response();

    if form.username != user.username
        && state
            .repo
            .get_user_by_username(&form.username)
            .await
            .is_some()
    {
        return Ok(conflict());
    }

    if state
        .repo
        .update_user_profile(user.id, &form.username, &form.name, form.lastname.as_deref())
        .await
        .is_none()
    {
        return Ok(conflict());
    }

    Ok(Redirect::to("/personal").into_response())
}

// --- Deletion Handlers ---

/// delete_post
///
/// [Authenticated Route] Deletes a post, owner or admin only, cascading to its
/// comments. An unauthorized actor gets the same redirect as a successful
/// delete and nothing happens; only a missing post is an error.
#[utoipa::path(
    get,
    path = "/delete/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 303, description = "Redirected home, deleted or not"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    actor: Actor,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !actor.is_authenticated() {
        return Ok(Redirect::to("/"));
    }

    let post = state
        .repo
        .get_post(post_id)
        .await
        .ok_or(AppError::NotFound)?;

    if guard::can_delete_post(&actor, &post) {
        state.repo.delete_post(post.id).await;
    }

    Ok(Redirect::to("/"))
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment, author or admin only. Same silent
/// no-op semantics as post deletion; the redirect returns to the thread.
#[utoipa::path(
    get,
    path = "/delete/post/{post_id}/comment/{comment_id}",
    params(
        ("post_id" = i64, Path, description = "Post ID, used for the redirect"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 303, description = "Redirected to the post, deleted or not"),
        (status = 404, description = "No such comment")
    )
)]
pub async fn delete_comment(
    actor: Actor,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    if !actor.is_authenticated() {
        return Ok(Redirect::to("/"));
    }

    let comment = state
        .repo
        .get_comment(comment_id)
        .await
        .ok_or(AppError::NotFound)?;

    if guard::can_delete_comment(&actor, &comment) {
        state.repo.delete_comment(comment.id).await;
    }

    Ok(Redirect::to(&format!("/post/{post_id}")))
}

// --- Admin Handlers ---

/// admin_page
///
/// [Admin Route] Every registered user, ordered by id. Non-admin actors are
/// silently redirected home.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "All users", body = AdminPage),
        (status = 303, description = "Not the administrator")
    )
)]
pub async fn admin_page(actor: Actor, State(state): State<AppState>) -> Response {
    if !guard::can_access_admin(&actor) {
        return Redirect::to("/").into_response();
    }
    Json(AdminPage {
        users: state.repo.list_users().await,
    })
    .into_response()
}

/// edit_user_page
///
/// [Admin Route] Profile form for any user, pre-filled.
#[utoipa::path(
    get,
    path = "/admin/user/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Pre-filled profile form", body = PersonalFormPage),
        (status = 303, description = "Not the administrator"),
        (status = 404, description = "No such user")
    )
)]
pub async fn edit_user_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !guard::can_access_admin(&actor) {
        return Ok(Redirect::to("/").into_response());
    }

    let user = state.repo.get_user(id).await.ok_or(AppError::NotFound)?;

    Ok(Json(PersonalFormPage {
        username: user.username,
        name: user.name,
        lastname: user.lastname,
    })
    .into_response())
}

/// update_user
///
/// [Admin Route] Edits any user's username and name fields. The username stays
/// uniqueness-checked even under admin privileges.
#[utoipa::path(
    post,
    path = "/admin/user/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = PersonalForm,
    responses(
        (status = 303, description = "Saved (redirect back), denied, or username conflict"),
        (status = 404, description = "No such user"),
        (status = 422, description = "Validation failure")
    )
)]
pub async fn update_user(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<PersonalForm>,
) -> Result<Response, AppError> {
    if !guard::can_access_admin(&actor) {
        return Ok(Redirect::to("/").into_response());
    }

    let user = state.repo.get_user(id).await.ok_or(AppError::NotFound)?;

    form.validate()?;

    let conflict = || {
        Redirect::to(&format!("/admin/user/{id}?flash={FLASH_USERNAME_TAKEN}")).into_response()
    };

    if form.username != user.username
        && state
            .repo
            .get_user_by_username(&form.username)
            .await
            .is_some()
    {
        return Ok(conflict());
    }

    if state
        .repo
        .update_user_profile(user.id, &form.username, &form.name, form.lastname.as_deref())
        .await
        .is_none()
    {
        return Ok(conflict());
    }

    Ok(Redirect::to(&format!("/admin/user/{id}")).into_response())
}

/// delete_user
///
/// [Admin Route] Deletes a user and everything they own: their posts, their
/// comments, comments left by others on their posts, and their sessions.
#[utoipa::path(
    get,
    path = "/admin/user/{id}/delete",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 303, description = "Deleted (redirect to admin) or denied (redirect home)"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !guard::can_access_admin(&actor) {
        return Ok(Redirect::to("/"));
    }

    let user = state.repo.get_user(id).await.ok_or(AppError::NotFound)?;
    state.repo.delete_user(user.id).await;

    Ok(Redirect::to("/admin"))
}
