use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::Claims;
use crate::error::AppError;

/// Lifetime of an admin bearer token.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Issues and verifies HS256 admin bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Sign a token for the admin identified by `admin_id`.
    pub fn issue(&self, admin_id: &str, email: &str) -> Result<String, AppError> {
        self.issue_at(admin_id, email, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        admin_id: &str,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: admin_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Auth(format!("Invalid token: {e}")))
    }
}
