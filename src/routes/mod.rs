pub mod health;
pub mod sessions;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(sessions::new_session)
        .service(sessions::create_session)
        .service(sessions::destroy_session)
        .service(users::new_user)
        .service(users::create_user)
        .service(users::show_user)
        .service(users::edit_user)
        .service(users::update_user)
        .service(tasks::home)
        .service(tasks::index)
        // `/tasks/new` must be registered ahead of `/tasks/{id}`.
        .service(tasks::new_task)
        .service(tasks::create_task)
        .service(tasks::show_task)
        .service(tasks::edit_task)
        .service(tasks::update_task)
        .service(tasks::confirm_destroy_task)
        .service(tasks::destroy_task);
}
