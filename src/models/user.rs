use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use super::presence;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up and profile form as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UserForm {
    #[serde(default)]
    #[validate(custom = "presence")]
    pub email: String,
    // This password field here is for input, it won't be stored directly in User model
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

impl UserForm {
    /// Pre-fills the edit form. Password fields always start empty.
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            ..Self::default()
        }
    }

    /// Keeps the email, drops anything secret before the form is shown again.
    pub fn without_passwords(self) -> Self {
        Self {
            email: self.email,
            ..Self::default()
        }
    }
}

/// Validated user fields. `password` is `None` on a profile update that
/// leaves the stored password alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub email: String,
    pub password: Option<String>,
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

impl User {
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Users whose email equals `email` exactly; the slice the email
    /// uniqueness rule needs to see.
    pub async fn with_email(pool: &SqlitePool, email: &str) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_all(pool)
            .await
    }

    pub async fn insert(
        pool: &SqlitePool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Updates the email and, when given, the password hash.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET email = ?, password_hash = COALESCE(?, password_hash), updated_at = ?
             WHERE id = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_user_form_validation() {
        let input = UserForm {
            email: "test@example.com".to_string(),
            password: "password".to_string(),
            password_confirmation: "password".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UserForm {
            email: "".to_string(),
            ..input
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_password_fields_are_not_echoed_back() {
        let form = UserForm {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
            password_confirmation: "secret".to_string(),
        };
        let shown = form.without_passwords();
        assert_eq!(shown.email, "user@example.com");
        assert!(shown.password.is_empty());
        assert!(shown.password_confirmation.is_empty());
    }
}
