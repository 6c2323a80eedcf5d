use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::AppError;

pub const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(subject: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Signing material for bearer tokens, built once from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, AppError> {
        self.issue_token_at(subject, Utc::now())
    }

    #[instrument(skip(self))]
    pub fn issue_token_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(subject, issued_at);
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Returns the token's subject, or an authentication error for anything
    /// expired, tampered with, or signed with another secret.
    #[instrument(skip_all)]
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => {
                warn!(error = %err, "Rejected bearer token");
                Err(AppError::Authentication(
                    "Invalid or expired token".to_string(),
                ))
            }
        }
    }
}
