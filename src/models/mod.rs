pub mod task;
pub mod user;

pub use task::{Task, TaskChanges, TaskForm, TaskStatus};
pub use user::{User, UserChanges, UserForm};

use validator::ValidationError;

/// Rejects empty and whitespace-only values.
pub fn presence(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("can't be blank".into());
        return Err(error);
    }
    Ok(())
}
