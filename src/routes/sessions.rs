use crate::{
    app::AppState,
    auth::{authenticate, LoginForm, Session},
    error::{redirect_with_flash, AppError},
    flash::FlashMessage,
    views::{self, Page},
};
use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse};

/// Login form.
#[get("/login")]
pub async fn new_session(req: HttpRequest) -> HttpResponse {
    views::render(&req, Page::new("Login", views::sessions::login_page("")))
}

/// Login
///
/// Checks the submitted credentials. On success the session cookie is set
/// and the browser is sent to `/` with "Login successful". On failure the
/// form is shown again (401) with "Login failed" and the email kept.
#[post("/login")]
pub async fn create_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let user = match authenticate(&state.pool, &form).await {
        Ok(user) => user,
        Err(AppError::LoginFailed) => {
            log::warn!("failed login attempt for {:?}", form.email.trim());
            return Ok(views::render(
                &req,
                Page::new("Login", views::sessions::login_page(form.email.trim()))
                    .status(StatusCode::UNAUTHORIZED)
                    .flash_now(FlashMessage::alert(AppError::LoginFailed.to_string())),
            ));
        }
        Err(e) => return Err(e),
    };

    let token = state.keys.issue(user.id)?;
    log::info!("user {} logged in", user.id);

    let mut response = redirect_with_flash("/", FlashMessage::notice("Login successful"));
    response
        .add_cookie(&state.session_cookie(token))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(response)
}

/// Logout
///
/// Clears the session cookie. Works whether or not a session exists.
#[post("/logout")]
pub async fn destroy_session(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if let Some(user) = session.user() {
        log::info!("user {} logged out", user.id);
    }
    let mut response = redirect_with_flash("/", FlashMessage::notice("Logged out"));
    response
        .add_cookie(&state.session_removal_cookie())
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(response)
}
