mod common;

use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use taskpad::auth::SESSION_COOKIE;
use taskpad::models::Task;

use common::{browser, create_any_user, sign_in_as, PASSWORD};

#[test_log::test(actix_rt::test)]
async fn test_login_with_valid_credentials() {
    let mut browser = browser().await;
    let user = create_any_user(&browser.state).await;
    browser.visit("/login").await;

    browser
        .submit(
            "/login",
            &[("email", user.email.as_str()), ("password", PASSWORD)],
        )
        .await;

    assert!(browser.has_content("Login successful"));
    assert_eq!(browser.path, "/");
    assert!(browser.has_cookie(SESSION_COOKIE));
    assert!(browser.has_link_to("My page", &format!("/users/{}", user.id)));
}

#[actix_rt::test]
async fn test_login_without_email() {
    let mut browser = browser().await;
    create_any_user(&browser.state).await;
    browser.visit("/login").await;

    browser
        .submit("/login", &[("email", ""), ("password", PASSWORD)])
        .await;

    assert!(browser.has_content("Login failed"));
    assert_eq!(browser.path, "/login");
    assert_eq!(browser.status, StatusCode::UNAUTHORIZED);
    assert!(!browser.has_cookie(SESSION_COOKIE));
}

#[actix_rt::test]
async fn test_login_with_wrong_password_keeps_email() {
    let mut browser = browser().await;
    let user = create_any_user(&browser.state).await;

    browser
        .submit(
            "/login",
            &[("email", user.email.as_str()), ("password", "wrong")],
        )
        .await;

    assert!(browser.has_content("Login failed"));
    assert_eq!(browser.path, "/login");
    assert_eq!(browser.field_value("email"), Some(user.email.clone()));
    assert!(!browser.has_cookie(SESSION_COOKIE));
}

#[actix_rt::test]
async fn test_logout() {
    let mut browser = browser().await;
    let user = create_any_user(&browser.state).await;
    sign_in_as(&mut browser, &user).await;

    browser.submit("/logout", &[]).await;

    assert!(browser.has_content("Logged out"));
    assert_eq!(browser.path, "/");
    assert!(!browser.has_cookie(SESSION_COOKIE));

    browser.visit("/tasks/new").await;
    assert!(browser.has_content("Login required"));
    assert_eq!(browser.path, "/login");
}

#[actix_rt::test]
async fn test_flash_is_shown_once() {
    let mut browser = browser().await;
    let user = create_any_user(&browser.state).await;
    sign_in_as(&mut browser, &user).await;

    browser.visit("/tasks").await;

    assert!(!browser.has_content("Login successful"));
}

#[actix_rt::test]
async fn test_session_of_deleted_user_requires_login_again() {
    let mut browser = browser().await;
    let user = create_any_user(&browser.state).await;
    sign_in_as(&mut browser, &user).await;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user.id)
        .execute(&browser.state.pool)
        .await
        .unwrap();

    browser
        .submit(
            "/tasks",
            &[("title", "orphan"), ("content", ""), ("status", "todo"), ("deadline", "")],
        )
        .await;

    assert!(browser.has_content("Login required"));
    assert_eq!(browser.path, "/login");
    assert!(Task::all(&browser.state.pool).await.unwrap().is_empty());
    assert!(!browser.body.contains("action=\"/logout\""));
}
