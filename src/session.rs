//! Signed session tokens.
//!
//! A session is an HS256 JWT carrying the user id and email. Tokens are not
//! stored server side: a token is valid as long as its signature checks out
//! and it has not expired.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// How long a freshly issued session stays valid, in days.
pub const SESSION_TTL_DAYS: i64 = 7;

pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// Identity of the user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user` that expires [`SESSION_TTL_DAYS`] after `issued_at`.
    pub fn issue(&self, user: &SessionUser, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + session_ttl()).timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Resolve a token to the user it was issued for.
    ///
    /// Every failure (bad signature, malformed token, expiry) is reported as
    /// [`AppError::Unauthorized`] so clients cannot tell them apart.
    pub fn resolve(&self, token: &str) -> AppResult<SessionUser> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::Unauthorized
            })?;

        let id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(SessionUser {
            id,
            email: data.claims.email,
        })
    }
}
