use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::SqlitePool;
use std::rc::Rc;

use crate::auth::token::SessionKeys;
use crate::models::User;

pub const SESSION_COOKIE: &str = "taskpad_session";

/// Resolves the session cookie into `Claims` on the request extensions.
///
/// Never rejects a request: pages decide for themselves whether they need a
/// session (see `CurrentUser`). A missing, tampered or expired cookie simply
/// leaves the request unauthenticated, and so does a valid token whose user
/// no longer exists.
pub struct SessionMiddleware {
    keys: SessionKeys,
    pool: SqlitePool,
}

impl SessionMiddleware {
    pub fn new(keys: SessionKeys, pool: SqlitePool) -> Self {
        Self { keys, pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
            pool: self.pool.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    keys: SessionKeys,
    pool: SqlitePool,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| match self.keys.verify(cookie.value()) {
                Ok(claims) => Some(claims),
                Err(e) => {
                    log::debug!("ignoring session cookie on {}: {}", req.path(), e);
                    None
                }
            });

        let service = Rc::clone(&self.service);
        let pool = self.pool.clone();

        Box::pin(async move {
            if let Some(claims) = claims {
                match User::find(&pool, claims.sub).await {
                    Ok(Some(_)) => {
                        req.extensions_mut().insert(claims);
                    }
                    Ok(None) => {
                        log::debug!("ignoring session for missing user {}", claims.sub);
                    }
                    Err(e) => {
                        log::error!("could not resolve session user {}: {}", claims.sub, e);
                    }
                }
            }
            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use actix_web::cookie::Cookie;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Claims>() {
            Some(claims) => HttpResponse::Ok().body(claims.sub.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    async fn pool_with_user() -> (SqlitePool, User) {
        let pool = crate::db::init("sqlite::memory:", 1).await.unwrap();
        let user = User::insert(&pool, "session@example.com", "not-a-real-hash")
            .await
            .unwrap();
        (pool, user)
    }

    #[actix_rt::test]
    async fn test_valid_cookie_attaches_claims() {
        let (pool, user) = pool_with_user().await;
        let keys = SessionKeys::new("middleware-secret", 1);
        let token = keys.issue(user.id).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(keys, pool))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user.id.to_string());
    }

    #[actix_rt::test]
    async fn test_bad_or_missing_cookie_is_anonymous() {
        let (pool, user) = pool_with_user().await;
        let keys = SessionKeys::new("middleware-secret", 1);
        let forged = SessionKeys::new("other-secret", 1).issue(user.id).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(keys, pool))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, forged))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");

        let req = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");
    }

    #[actix_rt::test]
    async fn test_token_for_deleted_user_is_anonymous() {
        let (pool, user) = pool_with_user().await;
        let keys = SessionKeys::new("middleware-secret", 1);
        let token = keys.issue(user.id).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(keys, pool.clone()))
                .route("/", web::get().to(whoami)),
        )
        .await;

        sqlx::query("DELETE FROM users")
            .execute(&pool)
            .await
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");
    }
}
