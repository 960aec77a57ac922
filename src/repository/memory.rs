use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::Repository;
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};

/// MemoryRepository
///
/// A complete map-backed implementation of the `Repository` trait with the same
/// observable semantics as the Postgres implementation: sequential ids starting
/// at 1 (so the first registered user is the administrator), uniqueness
/// conflicts reported as `None`, and explicit cascade deletes. Used by the test
/// suites and handy for running the server without a database.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    sessions: HashMap<Uuid, i64>,
    next_user_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_author_name(post: &Post, users: &BTreeMap<i64, User>) -> Post {
    let mut post = post.clone();
    post.author_name = users.get(&post.author_id).map(|u| u.name.clone());
    post
}

fn with_author_username(comment: &Comment, users: &BTreeMap<i64, User>) -> Comment {
    let mut comment = comment.clone();
    comment.author_username = users.get(&comment.author_id).map(|u| u.username.clone());
    comment
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Vec<User> {
        let state = self.state.lock().unwrap();
        // BTreeMap iteration is already ordered by id.
        state.users.values().cloned().collect()
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        self.state.lock().unwrap().users.get(&id).cloned()
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let state = self.state.lock().unwrap();
        state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    async fn create_user(&self, user: NewUser) -> Option<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.username == user.username) {
            return None;
        }
        state.next_user_id += 1;
        let id = state.next_user_id;
        let user = User {
            id,
            username: user.username,
            name: user.name,
            lastname: user.lastname,
            reg_date: user.reg_date,
            password: user.password,
        };
        state.users.insert(id, user.clone());
        Some(user)
    }

    async fn update_user_profile(
        &self,
        id: i64,
        username: &str,
        name: &str,
        lastname: Option<&str>,
    ) -> Option<User> {
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|u| u.username == username && u.id != id)
        {
            return None;
        }
        let user = state.users.get_mut(&id)?;
        user.username = username.to_string();
        user.name = name.to_string();
        user.lastname = lastname.map(str::to_string);
        Some(user.clone())
    }

    async fn delete_user(&self, id: i64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.users.remove(&id).is_none() {
            return false;
        }
        let owned_posts: Vec<i64> = state
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        state
            .comments
            .retain(|_, c| c.author_id != id && !owned_posts.contains(&c.post_id));
        state.posts.retain(|_, p| p.author_id != id);
        state.sessions.retain(|_, user_id| *user_id != id);
        true
    }

    async fn list_posts(&self) -> Vec<Post> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .map(|p| with_author_name(p, &state.users))
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    async fn get_post(&self, id: i64) -> Option<Post> {
        let state = self.state.lock().unwrap();
        state
            .posts
            .get(&id)
            .map(|p| with_author_name(p, &state.users))
    }

    async fn posts_by_author(&self, author_id: i64) -> Vec<Post> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| with_author_name(p, &state.users))
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    async fn create_post(&self, post: NewPost) -> Option<Post> {
        let mut state = self.state.lock().unwrap();
        if state.posts.values().any(|p| p.title == post.title) {
            return None;
        }
        state.next_post_id += 1;
        let id = state.next_post_id;
        let post = Post {
            id,
            title: post.title,
            content: post.content,
            date: post.date,
            author_id: post.author_id,
            author_name: None,
        };
        state.posts.insert(id, post.clone());
        Some(post)
    }

    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post> {
        let mut state = self.state.lock().unwrap();
        if state.posts.values().any(|p| p.title == title && p.id != id) {
            return None;
        }
        let post = state.posts.get_mut(&id)?;
        post.title = title.to_string();
        post.content = content.to_string();
        Some(post.clone())
    }

    async fn delete_post(&self, id: i64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.posts.remove(&id).is_none() {
            return false;
        }
        state.comments.retain(|_, c| c.post_id != id);
        true
    }

    async fn get_comment(&self, id: i64) -> Option<Comment> {
        let state = self.state.lock().unwrap();
        state
            .comments
            .get(&id)
            .map(|c| with_author_username(c, &state.users))
    }

    async fn comments_for_post(&self, post_id: i64) -> Vec<Comment> {
        let state = self.state.lock().unwrap();
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| with_author_username(c, &state.users))
            .collect();
        comments.sort_by(|a, b| a.date.cmp(&b.date));
        comments
    }

    async fn create_comment(&self, comment: NewComment) -> Option<Comment> {
        let mut state = self.state.lock().unwrap();
        // Referential integrity: both owners must exist.
        if !state.posts.contains_key(&comment.post_id)
            || !state.users.contains_key(&comment.author_id)
        {
            return None;
        }
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let comment = Comment {
            id,
            content: comment.content,
            date: comment.date,
            author_id: comment.author_id,
            post_id: comment.post_id,
            author_username: None,
        };
        state.comments.insert(id, comment.clone());
        Some(comment)
    }

    async fn delete_comment(&self, id: i64) -> bool {
        self.state.lock().unwrap().comments.remove(&id).is_some()
    }

    async fn create_session(&self, token_id: Uuid, user_id: i64) -> bool {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(token_id, user_id);
        true
    }

    async fn get_session(&self, token_id: Uuid) -> Option<i64> {
        self.state.lock().unwrap().sessions.get(&token_id).copied()
    }

    async fn delete_session(&self, token_id: Uuid) -> bool {
        self.state.lock().unwrap().sessions.remove(&token_id).is_some()
    }
}
