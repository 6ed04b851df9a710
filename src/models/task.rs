use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::presence;

/// Display format for deadlines, e.g. `2021/1/22 12:30`.
pub const DEADLINE_DISPLAY_FORMAT: &str = "%Y/%-m/%-d %-H:%-M";

/// Formats accepted from the deadline input (`datetime-local` and plain variants).
const DEADLINE_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Represents the status of a task.
/// Stored as lowercase text in the `tasks.status` column.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    Doing,
    /// Task is completed.
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Parses a deadline as submitted by the task form.
pub fn parse_deadline(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    DEADLINE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// Raw task form as submitted by the browser.
///
/// Every field is kept as text so a rejected submission can be shown back
/// exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    #[serde(default)]
    #[validate(custom = "presence")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deadline: String,
}

impl TaskForm {
    /// Pre-fills the edit form from a stored task. Seconds are only written
    /// when the stored deadline has them, so an unchanged resubmission keeps
    /// the same value.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            content: task.content.clone().unwrap_or_default(),
            status: task.status.to_string(),
            deadline: task
                .deadline
                .map(|d| {
                    let format = if d.second() == 0 {
                        "%Y-%m-%dT%H:%M"
                    } else {
                        "%Y-%m-%dT%H:%M:%S"
                    };
                    d.format(format).to_string()
                })
                .unwrap_or_default(),
        }
    }
}

/// Validated field set ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDateTime>,
}

/// Represents a task as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Sequential identifier; the first task created is `1`.
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDateTime>,
    /// Owner. Set once at creation and never changed.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, title, content, status, deadline, user_id, created_at, updated_at";

impl Task {
    pub fn deadline_display(&self) -> Option<String> {
        self.deadline
            .map(|d| d.format(DEADLINE_DISPLAY_FORMAT).to_string())
    }

    /// All tasks in creation order.
    pub async fn all(pool: &SqlitePool) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Tasks whose title equals `title` exactly; the slice the title
    /// uniqueness rule needs to see.
    pub async fn with_title(pool: &SqlitePool, title: &str) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE title = ?"))
            .bind(title)
            .fetch_all(pool)
            .await
    }

    pub async fn insert(
        pool: &SqlitePool,
        user_id: i64,
        changes: &TaskChanges,
    ) -> Result<Task, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, content, status, deadline, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.status)
        .bind(changes.deadline)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Overwrites the editable fields. `user_id` is not touched.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        changes: &TaskChanges,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = ?, content = ?, status = ?, deadline = ?, updated_at = ?
             WHERE id = ?
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.status)
        .bind(changes.deadline)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Permanently removes the task. Returns whether a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
