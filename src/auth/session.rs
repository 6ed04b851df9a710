use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The user a verified session cookie belongs to.
///
/// Used as a handler argument it is the login guard: extraction fails with
/// `AppError::AuthenticationRequired` (redirect to the login page with
/// "Login required") when the request carries no valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

impl CurrentUser {
    pub fn profile_path(&self) -> String {
        format!("/users/{}", self.id)
    }
}

/// Session state of a request, resolved by `SessionMiddleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Authenticated(CurrentUser),
    Unauthenticated,
}

impl Session {
    pub fn of(req: &HttpRequest) -> Self {
        match req.extensions().get::<Claims>() {
            Some(claims) => Session::Authenticated(CurrentUser { id: claims.sub }),
            None => Session::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<CurrentUser> {
        match self {
            Session::Authenticated(user) => Some(*user),
            Session::Unauthenticated => None,
        }
    }

    /// The guard for protected operations.
    pub fn require_login(&self) -> Result<CurrentUser, AppError> {
        self.user().ok_or(AppError::AuthenticationRequired)
    }
}

impl FromRequest for Session {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Session::of(req)))
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Session::of(req).require_login().map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    fn claims(sub: i64) -> Claims {
        Claims {
            sub,
            iat: 0,
            exp: usize::MAX,
        }
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims(123));

        let mut payload = Payload::None;
        let user = CurrentUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.id, 123);
        assert_eq!(user.profile_path(), "/users/123");
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_redirects_to_login() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_rt::test]
    async fn test_session_extractor_never_fails() {
        let req = test::TestRequest::default().to_http_request();
        let mut payload = Payload::None;
        let session = Session::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(session, Session::Unauthenticated);
        assert!(matches!(
            session.require_login(),
            Err(AppError::AuthenticationRequired)
        ));

        req.extensions_mut().insert(claims(7));
        let session = Session::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(session.user(), Some(CurrentUser { id: 7 }));
    }
}
