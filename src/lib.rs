#![doc = "The `taskpad` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, validators, session and ownership checks,"]
#![doc = "HTML views, routing configuration and error handling for the Taskpad application."]
#![doc = "It is used by the main binary (`main.rs`) and by the integration tests to build the app."]

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod models;
pub mod routes;
pub mod validation;
pub mod views;

pub use crate::app::AppState;
pub use crate::config::Config;
pub use crate::error::AppError;
