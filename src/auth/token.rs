use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Signs and verifies session tokens.
///
/// Built once from configuration and shared by the login handler (which
/// issues tokens) and `SessionMiddleware` (which verifies them).
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionKeys {
    /// `ttl_hours` is clamped to `1..=MAX_SESSION_TTL_HOURS`.
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        let hours = ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
        Self {
            secret: secret.into(),
            ttl: chrono::Duration::try_hours(hours).unwrap_or_else(chrono::Duration::zero),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issues a token for `user_id` that expires after the configured TTL.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Session TTL out of range".into()))?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn test_token_generation_and_verification() {
        let keys = SessionKeys::new("test_secret_for_gen_verify", 24);
        let token = keys.issue(1).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, 1);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let keys = SessionKeys::new("test_secret_for_expiration", 24);
        let issued = chrono::Utc::now() - chrono::Duration::hours(3);
        let claims_expired = Claims {
            sub: 2,
            iat: issued.timestamp() as usize,
            exp: (issued + chrono::Duration::hours(1)).timestamp() as usize,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret("test_secret_for_expiration".as_bytes()),
        )
        .unwrap();

        let err = keys.verify(&expired_token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = SessionKeys::new("one_secret", 24);
        let verifier = SessionKeys::new("a_completely_different_secret", 24);
        let token = issuer.issue(3).unwrap();

        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));

        assert!(verifier.verify("not-a-token").is_err());
    }

    #[test]
    fn test_debug_does_not_print_secret() {
        let keys = SessionKeys::new("super-secret", 1);
        assert!(!format!("{:?}", keys).contains("super-secret"));
    }

    #[test]
    fn test_ttl_is_clamped() {
        let huge = SessionKeys::new("super-secret", 3_000_000_000_000);
        assert_eq!(huge.ttl(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS));
        assert!(huge.issue(1).is_ok());

        let negative = SessionKeys::new("super-secret", -5);
        assert_eq!(negative.ttl(), chrono::Duration::hours(1));
    }
}
