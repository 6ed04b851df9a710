pub mod middleware;
pub mod password;
pub mod policy;
pub mod session;
pub mod token;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::User;

// Re-export necessary items
pub use middleware::{SessionMiddleware, SESSION_COOKIE};
pub use password::{hash_password, verify_password};
pub use policy::{authorize, can_modify, Decision};
pub use session::{CurrentUser, Session};
pub use token::{Claims, SessionKeys};

/// Represents the payload of the login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Checks an email/password pair against the stored users.
///
/// Unknown emails (including an empty one) and wrong passwords both yield
/// `AppError::LoginFailed`, without saying which it was.
pub async fn authenticate(pool: &SqlitePool, form: &LoginForm) -> Result<User, AppError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(AppError::LoginFailed);
    }

    let user = User::find_by_email(pool, email)
        .await?
        .ok_or(AppError::LoginFailed)?;

    let matches =
        password::verify_password_blocking(form.password.clone(), user.password_hash.clone())
            .await?;
    if matches {
        Ok(user)
    } else {
        Err(AppError::LoginFailed)
    }
}
