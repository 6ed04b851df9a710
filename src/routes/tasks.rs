use crate::{
    app::AppState,
    auth::{authorize, CurrentUser, Session},
    error::{redirect_with_flash, AppError},
    flash::FlashMessage,
    models::{Task, TaskForm},
    validation::{validate_task, FieldErrors, ValidationFailed},
    views::{self, Page},
};
use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

/// Where a non-owner is sent after trying to change someone else's task.
const TASK_DENIED_REDIRECT: &str = "/";

/// Body of the destroy confirmation form.
#[derive(Debug, Default, Deserialize)]
pub struct DestroyForm {
    #[serde(default)]
    pub confirm: String,
}

impl DestroyForm {
    pub fn confirmed(&self) -> bool {
        matches!(self.confirm.trim(), "yes" | "true")
    }
}

async fn find_task(state: &AppState, id: i64) -> Result<Task, AppError> {
    Task::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))
}

/// Loads a task and applies the ownership check for edit/update/destroy.
async fn find_owned_task(state: &AppState, user: CurrentUser, id: i64) -> Result<Task, AppError> {
    let task = find_task(state, id).await?;
    if let Err(denied) = authorize(user, &task).or_redirect_to(TASK_DENIED_REDIRECT) {
        log::warn!("user {} denied access to task {}", user.id, task.id);
        return Err(denied);
    }
    Ok(task)
}

async fn task_index(
    req: &HttpRequest,
    state: &AppState,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let tasks = Task::all(&state.pool).await?;
    Ok(views::render(
        req,
        Page::new("Tasks", views::tasks::index(&tasks, session.user())),
    ))
}

/// Task index. Public.
///
/// Every task is listed with a Show link. Edit and Destroy links appear only
/// for tasks the current user owns.
#[get("/tasks")]
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    task_index(&req, &state, session).await
}

/// The root page is the task index.
#[get("/")]
pub async fn home(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    task_index(&req, &state, session).await
}

/// New task form. Requires login.
#[get("/tasks/new")]
pub async fn new_task(req: HttpRequest, _user: CurrentUser) -> HttpResponse {
    views::render(
        &req,
        Page::new(
            "New Task",
            views::tasks::new_page(&TaskForm::default(), &FieldErrors::new()),
        ),
    )
}

fn render_rejected_new(req: &HttpRequest, failed: ValidationFailed<TaskForm>) -> HttpResponse {
    views::render(
        req,
        Page::new(
            "New Task",
            views::tasks::new_page(&failed.submitted, &failed.errors),
        )
        .status(StatusCode::UNPROCESSABLE_ENTITY),
    )
}

fn render_rejected_edit(
    req: &HttpRequest,
    task_id: i64,
    failed: ValidationFailed<TaskForm>,
) -> HttpResponse {
    views::render(
        req,
        Page::new(
            "Editing Task",
            views::tasks::edit_page(task_id, &failed.submitted, &failed.errors),
        )
        .status(StatusCode::UNPROCESSABLE_ENTITY),
    )
}

/// Creates a task owned by the current user.
///
/// On success redirects to the new task with "Task was successfully created.".
/// On validation failure re-renders the form (422) with the submitted values.
#[post("/tasks")]
pub async fn create_task(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let existing = Task::with_title(&state.pool, &form.title).await?;

    let changes = match validate_task(form.clone(), &existing, None) {
        Ok(changes) => changes,
        Err(failed) => {
            log::debug!("task rejected: {}", failed.errors);
            return Ok(render_rejected_new(&req, failed));
        }
    };

    let task = match Task::insert(&state.pool, user.id, &changes).await {
        Ok(task) => task,
        Err(e) => {
            let failed = ValidationFailed::on_conflict(e, "title", form)?;
            return Ok(render_rejected_new(&req, failed));
        }
    };

    log::info!("user {} created task {}", user.id, task.id);
    Ok(redirect_with_flash(
        &format!("/tasks/{}", task.id),
        FlashMessage::notice("Task was successfully created."),
    ))
}

/// Task detail. Public.
#[get("/tasks/{id}")]
pub async fn show_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    task_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = find_task(&state, task_id.into_inner()).await?;
    Ok(views::render(
        &req,
        Page::new(task.title.clone(), views::tasks::show(&task, session.user())),
    ))
}

/// Edit form. Requires login and ownership; non-owners go to `/` with
/// "Forbidden access.".
#[get("/tasks/{id}/edit")]
pub async fn edit_task(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = find_owned_task(&state, user, task_id.into_inner()).await?;
    Ok(views::render(
        &req,
        Page::new(
            "Editing Task",
            views::tasks::edit_page(task.id, &TaskForm::from_task(&task), &FieldErrors::new()),
        ),
    ))
}

/// Updates a task the current user owns. Ownership itself never changes.
#[post("/tasks/{id}")]
pub async fn update_task(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    let task = find_owned_task(&state, user, task_id.into_inner()).await?;
    let form = form.into_inner();
    let existing = Task::with_title(&state.pool, &form.title).await?;

    let changes = match validate_task(form.clone(), &existing, Some(task.id)) {
        Ok(changes) => changes,
        Err(failed) => {
            log::debug!("update of task {} rejected: {}", task.id, failed.errors);
            return Ok(render_rejected_edit(&req, task.id, failed));
        }
    };

    let task = match Task::update(&state.pool, task.id, &changes).await {
        Ok(task) => task,
        Err(e) => {
            let failed = ValidationFailed::on_conflict(e, "title", form)?;
            return Ok(render_rejected_edit(&req, task.id, failed));
        }
    };

    log::info!("user {} updated task {}", user.id, task.id);
    Ok(redirect_with_flash(
        &format!("/tasks/{}", task.id),
        FlashMessage::notice("Task was successfully updated."),
    ))
}

/// Asks for confirmation before a destroy. Removes nothing.
#[get("/tasks/{id}/destroy")]
pub async fn confirm_destroy_task(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = find_owned_task(&state, user, task_id.into_inner()).await?;
    Ok(views::render(
        &req,
        Page::new("Destroy Task", views::tasks::confirm_destroy(&task)),
    ))
}

/// Destroys a task once the confirmation has been submitted.
///
/// Without `confirm=yes` the confirmation page is shown again and the task
/// is left alone.
#[post("/tasks/{id}/destroy")]
pub async fn destroy_task(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState>,
    task_id: web::Path<i64>,
    form: web::Form<DestroyForm>,
) -> Result<HttpResponse, AppError> {
    let task = find_owned_task(&state, user, task_id.into_inner()).await?;

    if !form.confirmed() {
        return Ok(views::render(
            &req,
            Page::new("Destroy Task", views::tasks::confirm_destroy(&task)),
        ));
    }

    if !Task::delete(&state.pool, task.id).await? {
        return Err(AppError::NotFound(format!("Task {} not found", task.id)));
    }

    log::info!("user {} destroyed task {}", user.id, task.id);
    Ok(redirect_with_flash(
        "/tasks",
        FlashMessage::notice("Task was successfully destroyed."),
    ))
}
