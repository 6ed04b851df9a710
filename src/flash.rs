//! One-shot messages shown on the page that follows a redirect.
//!
//! A flash is written into a short-lived cookie by the redirecting response
//! and removed by whichever page renders it next.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

pub const FLASH_COOKIE: &str = "taskpad_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    /// Confirmation of a completed action.
    Notice,
    /// A refused or failed action.
    Alert,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Notice => "notice",
            FlashLevel::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Notice,
            text: text.into(),
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Alert,
            text: text.into(),
        }
    }

    /// Reads the pending flash, if any, from the request cookies.
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        let cookie = req.cookie(FLASH_COOKIE)?;
        Self::decode(cookie.value())
    }

    fn decode(value: &str) -> Option<Self> {
        let (level, text) = value.split_once(':')?;
        let level = match level {
            "notice" => FlashLevel::Notice,
            "alert" => FlashLevel::Alert,
            _ => return None,
        };
        if text.is_empty() {
            return None;
        }
        Some(Self {
            level,
            text: text.to_string(),
        })
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, format!("{}:{}", self.level.as_str(), self.text))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::minutes(5))
            .finish()
    }

    /// Cookie that tells the browser to drop a consumed flash.
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, "")
            .path("/")
            .max_age(Duration::ZERO)
            .finish()
    }
}
