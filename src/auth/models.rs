use serde::{Deserialize, Serialize};

/// Claims carried by an admin bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin id (hex ObjectId).
    pub sub: String,
    pub email: String,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}

/// An admin whose bearer token was verified for the current request.
///
/// Adding this extractor to a handler makes the route admin-only.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub admin_id: String,
    pub email: String,
}

impl From<Claims> for AuthenticatedAdmin {
    fn from(claims: Claims) -> Self {
        Self {
            admin_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
}
