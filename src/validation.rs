//! Field-level rules for tasks and users.
//!
//! Each validator takes the submitted form together with the existing records
//! that could collide with it, and either returns the typed change set or hands
//! the form back inside [`ValidationFailed`] so the page can be re-rendered with
//! the user's input intact.

use std::fmt;

use validator::{Validate, ValidationErrors};

use crate::models::task::parse_deadline;
use crate::models::{Task, TaskChanges, TaskForm, TaskStatus, User, UserChanges, UserForm};

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const INVALID: &str = "is invalid";
pub const NOT_IN_LIST: &str = "is not included in the list";
pub const CONFIRMATION_MISMATCH: &str = "doesn't match Password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Human label for the field, `password_confirmation` -> `Password confirmation`.
    pub fn label(&self) -> String {
        let spaced = self.field.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// e.g. `Title can't be blank`.
    pub fn full_message(&self) -> String {
        format!("{} {}", self.label(), self.message)
    }
}

/// Ordered list of field errors for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Collects `validator` errors, emitted in `order` so the banner is stable.
    pub fn from_validator(errors: &ValidationErrors, order: &[&'static str]) -> Self {
        let by_field = errors.field_errors();
        let mut collected = Self::new();
        for field in order {
            if let Some(list) = by_field.get(field) {
                for error in list.iter() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| INVALID.to_string());
                    collected.add(*field, message);
                }
            }
        }
        collected
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.0.iter().map(FieldError::full_message).collect()
    }

    /// `1 error prohibited this task from being saved:`
    pub fn banner(&self, resource: &str) -> String {
        let noun = if self.len() == 1 { "error" } else { "errors" };
        format!(
            "{} {} prohibited this {} from being saved:",
            self.len(),
            noun,
            resource
        )
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

/// A rejected submission: the errors plus the values as they were typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailed<F> {
    pub errors: FieldErrors,
    pub submitted: F,
}

impl<F> ValidationFailed<F> {
    pub fn new(errors: FieldErrors, submitted: F) -> Self {
        Self { errors, submitted }
    }

    /// A single uniqueness error, used when the storage constraint wins a race
    /// the application-level check could not see.
    pub fn taken(field: &'static str, submitted: F) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, TAKEN);
        Self::new(errors, submitted)
    }

    /// Turns a write rejected by the UNIQUE index on `field` into a `taken`
    /// failure. Any other error is handed back unchanged.
    pub fn on_conflict(
        error: sqlx::Error,
        field: &'static str,
        submitted: F,
    ) -> Result<Self, sqlx::Error> {
        if crate::db::is_unique_violation(&error) {
            Ok(Self::taken(field, submitted))
        } else {
            Err(error)
        }
    }
}

/// Whether a user form creates an account or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMode {
    SignUp,
    Update { user_id: i64 },
}

/// Validates a task form.
///
/// `existing` must contain every stored task that could share the submitted
/// title; `current_id` is the task being edited, which never collides with
/// itself.
pub fn validate_task(
    form: TaskForm,
    existing: &[Task],
    current_id: Option<i64>,
) -> Result<TaskChanges, ValidationFailed<TaskForm>> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from_validator(&e, &["title"]),
    };

    let title = form.title.clone();
    if !errors.has("title")
        && existing
            .iter()
            .any(|task| task.title == title && Some(task.id) != current_id)
    {
        errors.add("title", TAKEN);
    }

    let status = if form.status.trim().is_empty() {
        TaskStatus::default()
    } else {
        match form.status.parse::<TaskStatus>() {
            Ok(status) => status,
            Err(_) => {
                errors.add("status", NOT_IN_LIST);
                TaskStatus::default()
            }
        }
    };

    let deadline = if form.deadline.trim().is_empty() {
        None
    } else {
        let parsed = parse_deadline(&form.deadline);
        if parsed.is_none() {
            errors.add("deadline", INVALID);
        }
        parsed
    };

    if !errors.is_empty() {
        return Err(ValidationFailed::new(errors, form));
    }

    let content = match form.content.trim() {
        "" => None,
        _ => Some(form.content.clone()),
    };

    Ok(TaskChanges {
        title,
        content,
        status,
        deadline,
    })
}

/// Validates a sign-up or profile form.
///
/// `existing` must contain every stored user that could share the submitted
/// email. On sign-up a password is required; on update a blank password and
/// confirmation keep the stored one.
pub fn validate_user(
    form: UserForm,
    existing: &[User],
    mode: UserMode,
) -> Result<UserChanges, ValidationFailed<UserForm>> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from_validator(&e, &["email"]),
    };

    let email = form.email.trim().to_string();
    let current_id = match mode {
        UserMode::SignUp => None,
        UserMode::Update { user_id } => Some(user_id),
    };
    if !errors.has("email")
        && existing
            .iter()
            .any(|user| user.email == email && Some(user.id) != current_id)
    {
        errors.add("email", TAKEN);
    }

    let password_given = !form.password.is_empty() || !form.password_confirmation.is_empty();
    if mode == UserMode::SignUp && form.password.is_empty() {
        errors.add("password", BLANK);
    }
    if password_given && form.password != form.password_confirmation {
        errors.add("password_confirmation", CONFIRMATION_MISMATCH);
    }

    if !errors.is_empty() {
        return Err(ValidationFailed::new(errors, form));
    }

    Ok(UserChanges {
        email,
        password: password_given.then(|| form.password.clone()),
    })
}
