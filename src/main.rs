use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskpad::{auth::SessionMiddleware, db, routes, AppState, Config};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = db::init(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| startup_error("failed to prepare database", e))?;

    let state = AppState::new(pool, &config);

    log::info!("Starting Taskpad server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(SessionMiddleware::new(state.keys.clone(), state.pool.clone()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
