//! Ownership rules for mutating records.
//!
//! Reading is never gated here: any visitor may see any task. Editing or
//! destroying a task, and editing a profile, is permitted only to the owner.

use std::fmt;

use crate::auth::session::CurrentUser;
use crate::error::AppError;
use crate::models::{Task, User};

/// A record that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Task {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// A profile is owned by the user it describes.
impl Owned for User {
    fn owner_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Forbidden,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenyReason::Forbidden => f.write_str("forbidden"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Decision::Permit)
    }

    /// Turns a denial into `AuthorizationDenied` redirecting to `fallback`.
    pub fn or_redirect_to(self, fallback: impl Into<String>) -> Result<(), AppError> {
        match self {
            Decision::Permit => Ok(()),
            Decision::Deny(_) => Err(AppError::AuthorizationDenied {
                redirect_to: fallback.into(),
            }),
        }
    }
}

/// Decides whether `user` may edit or destroy `target`.
pub fn authorize<T: Owned + ?Sized>(user: CurrentUser, target: &T) -> Decision {
    if target.owner_id() == user.id {
        Decision::Permit
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// Presentation form of [`authorize`]: whether edit/destroy controls should be
/// offered to this viewer at all.
pub fn can_modify<T: Owned + ?Sized>(viewer: Option<CurrentUser>, target: &T) -> bool {
    viewer.map_or(false, |user| authorize(user, target).is_permitted())
}
