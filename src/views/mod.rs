//! Server-rendered HTML.
//!
//! Pages are plain strings assembled here; every user-supplied value goes
//! through [`escape`]. [`render`] wraps a page body in the shared layout,
//! shows pending flash messages and clears the flash cookie it consumed.

pub mod sessions;
pub mod tasks;
pub mod users;

use actix_web::{http::StatusCode, HttpRequest, HttpResponse};

use crate::auth::Session;
use crate::flash::FlashMessage;
use crate::validation::FieldErrors;

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn link(text: &str, href: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

/// The "N errors prohibited this X from being saved:" block.
pub fn error_explanation(errors: &FieldErrors, resource: &str) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .full_messages()
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(
        "<div id=\"error_explanation\"><h2>{}</h2><ul>{}</ul></div>\n",
        escape(&errors.banner(resource)),
        items
    )
}

/// A single labelled `<input>`.
pub fn input_field(id: &str, name: &str, label: &str, kind: &str, value: &str) -> String {
    format!(
        "<div class=\"field\"><label for=\"{id}\">{label}</label>\
         <input type=\"{kind}\" id=\"{id}\" name=\"{name}\" value=\"{value}\"></div>\n",
        id = id,
        name = name,
        label = escape(label),
        kind = kind,
        value = escape(value),
    )
}

pub struct Page {
    title: String,
    body: String,
    status: StatusCode,
    flash_now: Option<FlashMessage>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: String) -> Self {
        Self {
            title: title.into(),
            body,
            status: StatusCode::OK,
            flash_now: None,
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// A message for this response only, e.g. "Login failed" on a re-rendered form.
    pub fn flash_now(mut self, flash: FlashMessage) -> Self {
        self.flash_now = Some(flash);
        self
    }
}

fn navigation(session: &Session) -> String {
    match session.user() {
        Some(user) => format!(
            "<nav>{} | {} | {} | <form class=\"inline\" action=\"/logout\" method=\"post\">\
             <button type=\"submit\">Logout</button></form></nav>",
            link("Tasks", "/tasks"),
            link("New Task", "/tasks/new"),
            link("My page", &user.profile_path()),
        ),
        None => format!(
            "<nav>{} | {} | {}</nav>",
            link("Tasks", "/tasks"),
            link("Sign up", "/sign_up"),
            link("Login", "/login"),
        ),
    }
}

fn flash_html(flash: &FlashMessage) -> String {
    format!(
        "<p class=\"{}\">{}</p>\n",
        flash.level.as_str(),
        escape(&flash.text)
    )
}

pub fn render(req: &HttpRequest, page: Page) -> HttpResponse {
    let session = Session::of(req);
    let pending = FlashMessage::from_request(req);

    let mut flashes = String::new();
    if let Some(flash) = &page.flash_now {
        flashes.push_str(&flash_html(flash));
    }
    if let Some(flash) = &pending {
        flashes.push_str(&flash_html(flash));
    }

    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | Taskpad</title></head>\n\
         <body>\n{nav}\n{flashes}<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape(&page.title),
        nav = navigation(&session),
        flashes = flashes,
        body = page.body,
    );

    let mut response = HttpResponse::build(page.status);
    response.content_type("text/html; charset=utf-8");
    if pending.is_some() {
        response.cookie(FlashMessage::removal_cookie());
    }
    response.body(html)
}
