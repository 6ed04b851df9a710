#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::{time::Duration as CookieDuration, Cookie},
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    middleware::Logger,
    test, web, App, Error,
};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use taskpad::{
    auth::{hash_password, SessionMiddleware},
    db,
    models::{Task, TaskChanges, TaskStatus, User},
    routes,
    views::escape,
    AppState, Config,
};

/// Password every factory user is created with.
pub const PASSWORD: &str = "password";

const MAX_REDIRECTS: usize = 10;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        max_db_connections: 1,
        server_port: 0,
        server_host: "127.0.0.1".into(),
        session_secret: "integration-test-secret".into(),
        session_ttl_hours: 1,
        secure_cookies: false,
        bcrypt_cost: 4,
    }
}

/// A fresh, migrated in-memory database wrapped in application state.
pub async fn test_state() -> AppState {
    let config = test_config();
    let pool = db::init(&config.database_url, config.max_db_connections)
        .await
        .expect("Failed to prepare test database");
    AppState::new(pool, &config)
}

/// Drives the application the way a browser would: keeps cookies, follows
/// redirects and remembers where it ended up.
pub struct Browser<S> {
    app: S,
    pub state: AppState,
    cookies: BTreeMap<String, String>,
    pub path: String,
    pub status: StatusCode,
    pub body: String,
}

pub async fn browser() -> Browser<
    impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
> {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(SessionMiddleware::new(state.keys.clone(), state.pool.clone()))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    Browser {
        app,
        state,
        cookies: BTreeMap::new(),
        path: String::new(),
        status: StatusCode::OK,
        body: String::new(),
    }
}

impl<S, B> Browser<S>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    pub async fn visit(&mut self, path: &str) {
        let req = test::TestRequest::get().uri(path);
        self.send(path, req).await;
    }

    /// Posts a form the way a submit button does.
    pub async fn submit(&mut self, path: &str, fields: &[(&str, &str)]) {
        let req = test::TestRequest::post().uri(path).set_form(fields);
        self.send(path, req).await;
    }

    /// Follows the link whose text is `text` on the current page.
    pub async fn click_link(&mut self, text: &str) {
        let href = self
            .link_href(text)
            .unwrap_or_else(|| panic!("no link {:?} on {}:\n{}", text, self.path, self.body));
        self.visit(&href).await;
    }

    async fn send(&mut self, path: &str, req: test::TestRequest) {
        let mut path = path.to_string();
        let mut resp = self.call(req).await;

        for _ in 0..MAX_REDIRECTS {
            if !resp.status().is_redirection() {
                break;
            }
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|l| l.to_str().ok())
                .expect("redirect without a Location header")
                .to_string();
            path = location;
            resp = self.call(test::TestRequest::get().uri(&path)).await;
        }

        self.path = path;
        self.status = resp.status();
        let bytes = test::read_body(resp).await;
        self.body = String::from_utf8(bytes.to_vec()).expect("response body is not UTF-8");
    }

    async fn call(&mut self, mut req: test::TestRequest) -> ServiceResponse<B> {
        for (name, value) in &self.cookies {
            req = req.cookie(Cookie::new(name.clone(), value.clone()));
        }
        let resp = test::call_service(&self.app, req.to_request()).await;

        for cookie in resp.response().cookies() {
            let expired = cookie.max_age() == Some(CookieDuration::ZERO);
            if expired || cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
        resp
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }
}

impl<S> Browser<S> {
    /// Visible text of the current page with tags removed and whitespace collapsed.
    pub fn text(&self) -> String {
        let mut stripped = String::with_capacity(self.body.len());
        let mut in_tag = false;
        for c in self.body.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    stripped.push(' ');
                }
                '>' => in_tag = false,
                _ if !in_tag => stripped.push(c),
                _ => {}
            }
        }
        unescape(&stripped)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_content(&self, content: &str) -> bool {
        self.text().contains(content)
    }

    /// Target of the first link labelled `text`.
    pub fn link_href(&self, text: &str) -> Option<String> {
        let label = format!("\">{}</a>", escape(text));
        let end = self.body.find(&label)?;
        let start = self.body[..end].rfind("<a href=\"")? + "<a href=\"".len();
        Some(unescape(&self.body[start..end]))
    }

    pub fn has_link(&self, text: &str) -> bool {
        self.link_href(text).is_some()
    }

    /// Whether a link labelled `text` points at `href`.
    pub fn has_link_to(&self, text: &str, href: &str) -> bool {
        self.body
            .contains(&format!("<a href=\"{}\">{}</a>", escape(href), escape(text)))
    }

    /// Current value of the input named `name`.
    pub fn field_value(&self, name: &str) -> Option<String> {
        let marker = format!("name=\"{}\" value=\"", name);
        let start = self.body.find(&marker)? + marker.len();
        let len = self.body[start..].find('"')?;
        Some(unescape(&self.body[start..start + len]))
    }
}

fn unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

static SEQUENCE: AtomicUsize = AtomicUsize::new(1);

fn next_sequence() -> usize {
    SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

pub async fn create_user(state: &AppState, email: &str) -> User {
    let password_hash = hash_password(PASSWORD, state.bcrypt_cost).expect("Failed to hash password");
    User::insert(&state.pool, email, &password_hash)
        .await
        .expect("Failed to insert user")
}

/// A user with a sequenced email address.
pub async fn create_any_user(state: &AppState) -> User {
    create_user(state, &format!("user{}@example.com", next_sequence())).await
}

/// A task with factory defaults: sequenced title, "example content",
/// status todo and a deadline one week ahead.
pub async fn create_task(state: &AppState, owner: &User) -> Task {
    let title = format!("test{} title", next_sequence());
    create_task_with(state, owner, &title, TaskStatus::Todo).await
}

pub async fn create_task_with(
    state: &AppState,
    owner: &User,
    title: &str,
    status: TaskStatus,
) -> Task {
    let changes = TaskChanges {
        title: title.to_string(),
        content: Some("example content".to_string()),
        status,
        deadline: Some((Utc::now() + Duration::weeks(1)).naive_utc()),
    };
    Task::insert(&state.pool, owner.id, &changes)
        .await
        .expect("Failed to insert task")
}

pub async fn sign_in_as<S, B>(browser: &mut Browser<S>, user: &User)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    browser.visit("/login").await;
    browser
        .submit("/login", &[("email", user.email.as_str()), ("password", PASSWORD)])
        .await;
    assert!(
        browser.has_content("Login successful"),
        "sign in failed:\n{}",
        browser.body
    );
}
