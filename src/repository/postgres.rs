use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::models::{Comment, NewComment, NewPost, NewUser, Post, User};

const USER_COLUMNS: &str = "id, username, name, lastname, reg_date, password";

const POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.content, p.date, p.author_id, u.name AS author_name
    FROM posts p
    JOIN users u ON p.author_id = u.id
"#;

const COMMENT_WITH_AUTHOR: &str = r#"
    SELECT c.id, c.content, c.date, c.author_id, c.post_id, u.username AS author_username
    FROM comments c
    JOIN users u ON c.author_id = u.id
"#;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait backed by PostgreSQL.
/// Uses the runtime query API throughout so the crate builds without a live
/// database. The unique indexes on `users.username` and `posts.title` are the
/// final arbiters for concurrent registration/title races; the explicit
/// transactions below implement the cascade deletes (see schema.sql — the
/// schema deliberately carries no ON DELETE CASCADE).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Returns `None` for unique-constraint violations so callers see a conflict,
/// logs and swallows every other database error.
fn filter_conflict<T>(result: Result<T, sqlx::Error>, op: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            tracing::debug!("{op}: unique constraint violation");
            None
        }
        Err(e) => {
            tracing::error!("{op} error: {:?}", e);
            None
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_users(&self) -> Vec<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        match sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_by_username error: {:?}", e);
                None
            })
    }

    async fn create_user(&self, user: NewUser) -> Option<User> {
        let query = format!(
            "INSERT INTO users (username, name, lastname, reg_date, password) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.lastname)
            .bind(user.reg_date)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .await;
        filter_conflict(result, "create_user")
    }

    async fn update_user_profile(
        &self,
        id: i64,
        username: &str,
        name: &str,
        lastname: Option<&str>,
    ) -> Option<User> {
        let query = format!(
            "UPDATE users SET username = $2, name = $3, lastname = $4 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(username)
            .bind(name)
            .bind(lastname)
            .fetch_optional(&self.pool)
            .await;
        filter_conflict(result, "update_user_profile").flatten()
    }

    async fn delete_user(&self, id: i64) -> bool {
        // Explicit cascade: comments on the user's posts, the user's own
        // comments, their posts, their sessions, then the user. One transaction
        // so a failure leaves everything in place.
        let result: Result<u64, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query(
                "DELETE FROM comments WHERE post_id IN (SELECT id FROM posts WHERE author_id = $1)",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            sqlx::query("DELETE FROM comments WHERE author_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM posts WHERE author_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM sessions WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let res = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(res.rows_affected())
        }
        .await;

        match result {
            Ok(rows) => rows > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    async fn list_posts(&self) -> Vec<Post> {
        let query = format!("{POST_WITH_AUTHOR} ORDER BY p.date DESC");
        match sqlx::query_as::<_, Post>(&query).fetch_all(&self.pool).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!("list_posts error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_post(&self, id: i64) -> Option<Post> {
        let query = format!("{POST_WITH_AUTHOR} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_post error: {:?}", e);
                None
            })
    }

    async fn posts_by_author(&self, author_id: i64) -> Vec<Post> {
        let query = format!("{POST_WITH_AUTHOR} WHERE p.author_id = $1 ORDER BY p.date DESC");
        match sqlx::query_as::<_, Post>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!("posts_by_author error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_post(&self, post: NewPost) -> Option<Post> {
        let result = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (title, content, date, author_id) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, content, date, author_id",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.date)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await;
        filter_conflict(result, "create_post")
    }

    async fn update_post(&self, id: i64, title: &str, content: &str) -> Option<Post> {
        let result = sqlx::query_as::<_, Post>(
            "UPDATE posts SET title = $2, content = $3 WHERE id = $1 \
             RETURNING id, title, content, date, author_id",
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await;
        filter_conflict(result, "update_post").flatten()
    }

    async fn delete_post(&self, id: i64) -> bool {
        let result: Result<u64, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM comments WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let res = sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(res.rows_affected())
        }
        .await;

        match result {
            Ok(rows) => rows > 0,
            Err(e) => {
                tracing::error!("delete_post error: {:?}", e);
                false
            }
        }
    }

    async fn get_comment(&self, id: i64) -> Option<Comment> {
        let query = format!("{COMMENT_WITH_AUTHOR} WHERE c.id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_comment error: {:?}", e);
                None
            })
    }

    async fn comments_for_post(&self, post_id: i64) -> Vec<Comment> {
        let query = format!("{COMMENT_WITH_AUTHOR} WHERE c.post_id = $1 ORDER BY c.date ASC");
        match sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!("comments_for_post error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_comment(&self, comment: NewComment) -> Option<Comment> {
        let result = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (content, date, author_id, post_id) VALUES ($1, $2, $3, $4) \
             RETURNING id, content, date, author_id, post_id",
        )
        .bind(&comment.content)
        .bind(comment.date)
        .bind(comment.author_id)
        .bind(comment.post_id)
        .fetch_one(&self.pool)
        .await;
        filter_conflict(result, "create_comment")
    }

    async fn delete_comment(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_comment error: {:?}", e);
                false
            }
        }
    }

    async fn create_session(&self, token_id: Uuid, user_id: i64) -> bool {
        match sqlx::query("INSERT INTO sessions (token_id, user_id) VALUES ($1, $2)")
            .bind(token_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("create_session error: {:?}", e);
                false
            }
        }
    }

    async fn get_session(&self, token_id: Uuid) -> Option<i64> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM sessions WHERE token_id = $1")
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_session error: {:?}", e);
                None
            })
    }

    async fn delete_session(&self, token_id: Uuid) -> bool {
        match sqlx::query("DELETE FROM sessions WHERE token_id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_session error: {:?}", e);
                false
            }
        }
    }
}
