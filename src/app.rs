//! Shared application state.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use sqlx::SqlitePool;

use crate::auth::{SessionKeys, SESSION_COOKIE};
use crate::config::Config;

/// Handed to every handler through `web::Data<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub keys: SessionKeys,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            keys: SessionKeys::new(config.session_secret.clone(), config.session_ttl_hours),
            bcrypt_cost: config.bcrypt_cost,
            secure_cookies: config.secure_cookies,
        }
    }

    /// Cookie carrying a freshly issued session token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(Duration::seconds(self.keys.ttl().num_seconds()))
            .finish()
    }

    pub fn session_removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .max_age(Duration::ZERO)
            .finish()
    }
}
