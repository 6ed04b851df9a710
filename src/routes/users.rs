use crate::{
    app::AppState,
    auth::{authorize, password::hash_password_blocking, CurrentUser},
    error::{redirect_with_flash, AppError},
    flash::FlashMessage,
    models::{Task, User, UserForm},
    validation::{validate_user, FieldErrors, UserMode, ValidationFailed},
    views::{self, Page},
};
use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse};

async fn find_user(state: &AppState, id: i64) -> Result<User, AppError> {
    User::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

/// Loads a user and checks that it is the current user. Anyone else is sent
/// back to their own profile with "Forbidden access.".
async fn find_self(state: &AppState, user: CurrentUser, id: i64) -> Result<User, AppError> {
    let target = find_user(state, id).await?;
    if let Err(denied) = authorize(user, &target).or_redirect_to(user.profile_path()) {
        log::warn!("user {} denied access to user {}", user.id, target.id);
        return Err(denied);
    }
    Ok(target)
}

fn render_rejected_sign_up(req: &HttpRequest, failed: ValidationFailed<UserForm>) -> HttpResponse {
    views::render(
        req,
        Page::new(
            "Sign up",
            views::users::sign_up_page(&failed.submitted.without_passwords(), &failed.errors),
        )
        .status(StatusCode::UNPROCESSABLE_ENTITY),
    )
}

fn render_rejected_edit(
    req: &HttpRequest,
    user_id: i64,
    failed: ValidationFailed<UserForm>,
) -> HttpResponse {
    views::render(
        req,
        Page::new(
            "Editing User",
            views::users::edit_page(
                user_id,
                &failed.submitted.without_passwords(),
                &failed.errors,
            ),
        )
        .status(StatusCode::UNPROCESSABLE_ENTITY),
    )
}

/// Sign-up form. Public.
#[get("/sign_up")]
pub async fn new_user(req: HttpRequest) -> HttpResponse {
    views::render(
        &req,
        Page::new(
            "Sign up",
            views::users::sign_up_page(&UserForm::default(), &FieldErrors::new()),
        ),
    )
}

/// Sign up
///
/// Creates an account and sends the browser to the login page with
/// "User was successfully created.". The new user is not logged in.
#[post("/users")]
pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let existing = User::with_email(&state.pool, form.email.trim()).await?;

    let changes = match validate_user(form.clone(), &existing, UserMode::SignUp) {
        Ok(changes) => changes,
        Err(failed) => {
            log::debug!("sign up rejected: {}", failed.errors);
            return Ok(render_rejected_sign_up(&req, failed));
        }
    };

    let password = changes.password.unwrap_or_default();
    let password_hash = hash_password_blocking(password, state.bcrypt_cost).await?;

    let user = match User::insert(&state.pool, &changes.email, &password_hash).await {
        Ok(user) => user,
        Err(e) => {
            let failed = ValidationFailed::on_conflict(e, "email", form)?;
            return Ok(render_rejected_sign_up(&req, failed));
        }
    };

    log::info!("user {} signed up", user.id);
    Ok(redirect_with_flash(
        "/login",
        FlashMessage::notice("User was successfully created."),
    ))
}

/// Profile page: the user's email and their tasks. Requires login.
#[get("/users/{id}")]
pub async fn show_user(
    req: HttpRequest,
    viewer: CurrentUser,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = find_user(&state, user_id.into_inner()).await?;
    let tasks = Task::for_user(&state.pool, user.id).await?;
    Ok(views::render(
        &req,
        Page::new(
            views::users::profile_title(&user, Some(viewer)),
            views::users::profile(&user, &tasks, Some(viewer)),
        ),
    ))
}

/// Profile edit form. Only for the profile's own user.
#[get("/users/{id}/edit")]
pub async fn edit_user(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let target = find_self(&state, user, user_id.into_inner()).await?;
    Ok(views::render(
        &req,
        Page::new(
            "Editing User",
            views::users::edit_page(
                target.id,
                &UserForm::from_user(&target),
                &FieldErrors::new(),
            ),
        ),
    ))
}

/// Profile update. Leaving both password fields blank keeps the password.
#[post("/users/{id}")]
pub async fn update_user(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    let target = find_self(&state, user, user_id.into_inner()).await?;
    let form = form.into_inner();
    let existing = User::with_email(&state.pool, form.email.trim()).await?;

    let mode = UserMode::Update { user_id: target.id };
    let changes = match validate_user(form.clone(), &existing, mode) {
        Ok(changes) => changes,
        Err(failed) => {
            log::debug!("update of user {} rejected: {}", target.id, failed.errors);
            return Ok(render_rejected_edit(&req, target.id, failed));
        }
    };

    let password_hash = match changes.password {
        Some(password) => Some(hash_password_blocking(password, state.bcrypt_cost).await?),
        None => None,
    };

    let updated = match User::update(
        &state.pool,
        target.id,
        &changes.email,
        password_hash.as_deref(),
    )
    .await
    {
        Ok(updated) => updated,
        Err(e) => {
            let failed = ValidationFailed::on_conflict(e, "email", form)?;
            return Ok(render_rejected_edit(&req, target.id, failed));
        }
    };

    log::info!("user {} updated their profile", updated.id);
    Ok(redirect_with_flash(
        &format!("/users/{}", updated.id),
        FlashMessage::notice("User was successfully updated."),
    ))
}
