use crate::auth::{can_modify, CurrentUser};
use crate::models::{Task, TaskForm, TaskStatus};
use crate::validation::FieldErrors;

use super::{error_explanation, escape, input_field, link};

/// Table of tasks with a Show link for everyone and Edit/Destroy links only
/// for tasks the viewer owns.
pub fn task_table(tasks: &[Task], viewer: Option<CurrentUser>) -> String {
    if tasks.is_empty() {
        return "<p>No tasks yet.</p>\n".to_string();
    }

    let rows: String = tasks
        .iter()
        .map(|task| {
            let path = format!("/tasks/{}", task.id);
            let mut controls = link("Show", &path);
            if can_modify(viewer, task) {
                controls.push_str(" | ");
                controls.push_str(&link("Edit", &format!("{}/edit", path)));
                controls.push_str(" | ");
                controls.push_str(&link("Destroy", &format!("{}/destroy", path)));
            }
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&task.title),
                task.status,
                task.deadline_display().unwrap_or_default(),
                controls
            )
        })
        .collect();

    format!(
        "<table>\n<thead><tr><th>Title</th><th>Status</th><th>Deadline</th><th></th></tr></thead>\n\
         <tbody>\n{}</tbody>\n</table>\n",
        rows
    )
}

pub fn index(tasks: &[Task], viewer: Option<CurrentUser>) -> String {
    let mut body = String::from("<h1>Tasks</h1>\n");
    body.push_str(&task_table(tasks, viewer));
    if viewer.is_some() {
        body.push_str(&format!("<p>{}</p>\n", link("New Task", "/tasks/new")));
    }
    body
}

pub fn show(task: &Task, viewer: Option<CurrentUser>) -> String {
    let mut body = format!(
        "<h1>Task</h1>\n\
         <p>Title: {}</p>\n\
         <p>Content: {}</p>\n\
         <p>Status: {}</p>\n\
         <p>Deadline: {}</p>\n",
        escape(&task.title),
        escape(task.content.as_deref().unwrap_or_default()),
        task.status,
        task.deadline_display().unwrap_or_default(),
    );

    let mut links = Vec::new();
    if can_modify(viewer, task) {
        links.push(link("Edit", &format!("/tasks/{}/edit", task.id)));
    }
    links.push(link("Back", "/tasks"));
    body.push_str(&format!("<p>{}</p>\n", links.join(" | ")));
    body
}

fn status_options(selected: &str) -> String {
    let selected = selected.trim();
    TaskStatus::ALL
        .iter()
        .map(|status| {
            let is_selected = status.as_str() == selected
                || (selected.is_empty() && *status == TaskStatus::default());
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                status,
                if is_selected { " selected" } else { "" }
            )
        })
        .collect()
}

/// The task form; `action` is `/tasks` for create and `/tasks/{id}` for update.
pub fn form(form: &TaskForm, errors: &FieldErrors, action: &str, submit: &str) -> String {
    format!(
        "{errors}<form action=\"{action}\" method=\"post\">\n\
         {title}\
         <div class=\"field\"><label for=\"task_content\">Content</label>\
         <textarea id=\"task_content\" name=\"content\">{content}</textarea></div>\n\
         <div class=\"field\"><label for=\"task_status\">Status</label>\
         <select id=\"task_status\" name=\"status\">{options}</select></div>\n\
         {deadline}\
         <div class=\"actions\"><button type=\"submit\">{submit}</button></div>\n\
         </form>\n",
        errors = error_explanation(errors, "task"),
        action = escape(action),
        title = input_field("task_title", "title", "Title", "text", &form.title),
        content = escape(&form.content),
        options = status_options(&form.status),
        deadline = input_field(
            "task_deadline",
            "deadline",
            "Deadline",
            "datetime-local",
            &form.deadline
        ),
        submit = escape(submit),
    )
}

pub fn new_page(task_form: &TaskForm, errors: &FieldErrors) -> String {
    format!(
        "<h1>New Task</h1>\n{}<p>{}</p>\n",
        form(task_form, errors, "/tasks", "Create Task"),
        link("Back", "/tasks")
    )
}

pub fn edit_page(task_id: i64, task_form: &TaskForm, errors: &FieldErrors) -> String {
    let path = format!("/tasks/{}", task_id);
    format!(
        "<h1>Editing Task</h1>\n{}<p>{} | {}</p>\n",
        form(task_form, errors, &path, "Update Task"),
        link("Show", &path),
        link("Back", "/tasks")
    )
}

/// First half of the two-step destroy: nothing is removed until the OK
/// button posts `confirm=yes` back.
pub fn confirm_destroy(task: &Task) -> String {
    let path = format!("/tasks/{}", task.id);
    format!(
        "<h1>Destroy Task</h1>\n\
         <p>Are you sure you want to destroy &quot;{title}&quot;?</p>\n\
         <form action=\"{path}/destroy\" method=\"post\">\
         <input type=\"hidden\" name=\"confirm\" value=\"yes\">\
         <button type=\"submit\">OK</button></form>\n\
         <p>{cancel}</p>\n",
        title = escape(&task.title),
        path = path,
        cancel = link("Cancel", &path),
    )
}
