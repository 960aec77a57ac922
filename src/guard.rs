//! The authorization guard.
//!
//! Pure decision logic over (actor, resource): no I/O, no side effects, and a
//! boolean answer rather than an error. Callers translate a `false` into the
//! appropriate silent redirect; the guard itself never decides responses.
//!
//! Every mutation handler calls one of these predicates explicitly before
//! touching the repository. There is no middleware-level enforcement on
//! purpose: the checks are visible at the call site.

use crate::auth::Actor;
use crate::models::{Comment, Post};

/// The reserved identity granted unrestricted authorization: the first-created
/// user. Ids are sequential, so the first registration always lands on 1.
pub const ADMIN_ID: i64 = 1;

/// True iff the actor is authenticated and is either the post's author or the
/// administrator.
pub fn can_edit_post(actor: &Actor, post: &Post) -> bool {
    match actor.id() {
        Some(id) => id == post.author_id || id == ADMIN_ID,
        None => false,
    }
}

/// Deletion uses the same predicate as editing.
pub fn can_delete_post(actor: &Actor, post: &Post) -> bool {
    can_edit_post(actor, post)
}

/// True iff the actor authored the comment or is the administrator. An
/// anonymous actor has no id and therefore never qualifies.
pub fn can_delete_comment(actor: &Actor, comment: &Comment) -> bool {
    match actor.id() {
        Some(id) => id == comment.author_id || id == ADMIN_ID,
        None => false,
    }
}

/// True iff the actor is the authenticated administrator.
pub fn can_access_admin(actor: &Actor) -> bool {
    actor.id() == Some(ADMIN_ID)
}

/// Commenting only requires being authenticated.
pub fn can_comment(actor: &Actor) -> bool {
    actor.is_authenticated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Actor, Identity};
    use crate::models::User;
    use uuid::Uuid;

    fn actor(id: i64) -> Actor {
        Actor::Authenticated(Identity {
            user: User {
                id,
                username: format!("user{id}"),
                name: "Test".to_string(),
                ..User::default()
            },
            token_id: Uuid::new_v4(),
        })
    }

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 10,
            author_id,
            ..Post::default()
        }
    }

    fn comment_by(author_id: i64) -> Comment {
        Comment {
            id: 20,
            author_id,
            post_id: 10,
            ..Comment::default()
        }
    }

    #[test]
    fn test_author_can_edit_own_post() {
        assert!(can_edit_post(&actor(5), &post_by(5)));
    }

    #[test]
    fn test_other_user_cannot_edit_post() {
        assert!(!can_edit_post(&actor(6), &post_by(5)));
    }

    #[test]
    fn test_admin_can_edit_any_post() {
        assert!(can_edit_post(&actor(ADMIN_ID), &post_by(5)));
    }

    #[test]
    fn test_anonymous_cannot_edit_or_delete() {
        assert!(!can_edit_post(&Actor::Anonymous, &post_by(5)));
        assert!(!can_delete_post(&Actor::Anonymous, &post_by(5)));
        assert!(!can_delete_comment(&Actor::Anonymous, &comment_by(5)));
    }

    #[test]
    fn test_delete_post_matches_edit_predicate() {
        assert!(can_delete_post(&actor(5), &post_by(5)));
        assert!(!can_delete_post(&actor(6), &post_by(5)));
        assert!(can_delete_post(&actor(ADMIN_ID), &post_by(5)));
    }

    #[test]
    fn test_comment_deletion_owner_and_admin_only() {
        assert!(can_delete_comment(&actor(7), &comment_by(7)));
        assert!(!can_delete_comment(&actor(8), &comment_by(7)));
        assert!(can_delete_comment(&actor(ADMIN_ID), &comment_by(7)));
    }

    #[test]
    fn test_admin_access() {
        assert!(can_access_admin(&actor(ADMIN_ID)));
        assert!(!can_access_admin(&actor(2)));
        assert!(!can_access_admin(&Actor::Anonymous));
    }

    #[test]
    fn test_commenting_requires_authentication_only() {
        assert!(can_comment(&actor(9)));
        assert!(!can_comment(&Actor::Anonymous));
    }
}
