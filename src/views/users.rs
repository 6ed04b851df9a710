use crate::auth::CurrentUser;
use crate::models::{Task, User, UserForm};
use crate::validation::FieldErrors;

use super::tasks::task_table;
use super::{error_explanation, escape, input_field, link};

fn form(form: &UserForm, errors: &FieldErrors, action: &str, submit: &str) -> String {
    format!(
        "{errors}<form action=\"{action}\" method=\"post\">\n{email}{password}{confirmation}\
         <div class=\"actions\"><button type=\"submit\">{submit}</button></div>\n</form>\n",
        errors = error_explanation(errors, "user"),
        action = escape(action),
        email = input_field("user_email", "email", "Email", "email", &form.email),
        password = input_field("user_password", "password", "Password", "password", ""),
        confirmation = input_field(
            "user_password_confirmation",
            "password_confirmation",
            "Password confirmation",
            "password",
            ""
        ),
        submit = escape(submit),
    )
}

pub fn sign_up_page(user_form: &UserForm, errors: &FieldErrors) -> String {
    format!(
        "<h1>Sign up</h1>\n{}<p>{}</p>\n",
        form(user_form, errors, "/users", "SignUp"),
        link("Login", "/login")
    )
}

pub fn edit_page(user_id: i64, user_form: &UserForm, errors: &FieldErrors) -> String {
    let path = format!("/users/{}", user_id);
    format!(
        "<h1>Editing User</h1>\n{}<p>{}</p>\n",
        form(user_form, errors, &path, "Update"),
        link("Back", &path)
    )
}

fn task_count(count: usize, own: bool) -> String {
    let subject = if own { "You have" } else { "This user has" };
    match count {
        1 => format!("{} 1 task.", subject),
        n => format!("{} {} tasks.", subject, n),
    }
}

fn is_own(user: &User, viewer: Option<CurrentUser>) -> bool {
    viewer.map_or(false, |v| v.id == user.id)
}

/// "My page" for the signed-in user, "User profile" for anyone else.
pub fn profile_title(user: &User, viewer: Option<CurrentUser>) -> &'static str {
    if is_own(user, viewer) {
        "My page"
    } else {
        "User profile"
    }
}

/// The user's email and their tasks.
pub fn profile(user: &User, tasks: &[Task], viewer: Option<CurrentUser>) -> String {
    let own = is_own(user, viewer);
    let mut body = format!(
        "<h1>{}</h1>\n<p>Email: {}</p>\n<p>{}</p>\n",
        profile_title(user, viewer),
        escape(&user.email),
        task_count(tasks.len(), own)
    );
    body.push_str(&task_table(tasks, viewer));
    if own {
        body.push_str(&format!(
            "<p>{}</p>\n",
            link("Edit profile", &format!("/users/{}/edit", user.id))
        ));
    }
    body
}
