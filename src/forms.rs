//! Form payloads and validation.
//!
//! Each submit route deserializes one of these structs and calls `validate()`
//! before anything else happens. Validation failures surface as a 422 with
//! field-level messages; handlers never see half-validated input.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One failed field with a human-readable message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// The full set of validation failures for one submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn check(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

/// Minimum length for a registration secret.
const MIN_PASSWORD_LEN: usize = 8;

fn required(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError {
            field,
            message: "this field is required",
        });
    }
}

/// Usernames travel inside redirect query strings (conflict redirects carry the
/// attempted name), so the charset is restricted to URL-safe characters.
fn valid_username(errors: &mut Vec<FieldError>, value: &str) {
    required(errors, "username", value);
    if value.len() > 64 {
        errors.push(FieldError {
            field: "username",
            message: "must be at most 64 characters",
        });
    }
    if !value.trim().is_empty()
        && !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        errors.push(FieldError {
            field: "username",
            message: "only letters, digits, '.', '_' and '-' are allowed",
        });
    }
}

/// RegisterForm
///
/// Payload for POST /register.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RegisterForm {
    pub username: String,
    pub name: String,
    pub lastname: Option<String>,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        valid_username(&mut errors, &self.username);
        required(&mut errors, "name", &self.name);
        if self.password.len() < MIN_PASSWORD_LEN {
            errors.push(FieldError {
                field: "password",
                message: "must be at least 8 characters",
            });
        }
        ValidationErrors::check(errors)
    }
}

/// LoginForm
///
/// Payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        required(&mut errors, "username", &self.username);
        required(&mut errors, "password", &self.password);
        ValidationErrors::check(errors)
    }
}

/// PostForm
///
/// Payload for POST /new-post and POST /edit-post/{id}. Content is raw HTML
/// here; the handler sanitizes it before persistence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        required(&mut errors, "title", &self.title);
        required(&mut errors, "content", &self.content);
        ValidationErrors::check(errors)
    }
}

/// CommentForm
///
/// Payload for POST /post/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        required(&mut errors, "text", &self.text);
        ValidationErrors::check(errors)
    }
}

/// PersonalForm
///
/// Payload for POST /personal/edit and the admin's POST /admin/user/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PersonalForm {
    pub username: String,
    pub name: String,
    pub lastname: Option<String>,
}

impl PersonalForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        valid_username(&mut errors, &self.username);
        required(&mut errors, "name", &self.name);
        ValidationErrors::check(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_form_valid() {
        let form = RegisterForm {
            username: "alice_01".to_string(),
            name: "Alice".to_string(),
            lastname: None,
            password: "longenough".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_register_form_short_password() {
        let form = RegisterForm {
            username: "alice".to_string(),
            name: "Alice".to_string(),
            lastname: None,
            password: "short".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.errors.iter().any(|e| e.field == "password"));
    }

    #[test]
    fn test_register_form_bad_username_charset() {
        let form = RegisterForm {
            username: "evil name?x=1".to_string(),
            name: "Eve".to_string(),
            lastname: None,
            password: "longenough".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.errors.iter().any(|e| e.field == "username"));
    }

    #[test]
    fn test_post_form_requires_both_fields() {
        let form = PostForm {
            title: "  ".to_string(),
            content: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn test_comment_form_blank() {
        let form = CommentForm { text: "".to_string() };
        assert!(form.validate().is_err());
    }
}
