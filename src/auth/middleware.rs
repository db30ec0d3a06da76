use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::error::AppError;

/// Bearer-token guard for admin-only routes.
///
/// Rejects with 401 when the `Authorization` header is missing, is not a
/// bearer credential, or carries a token that fails verification.
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    tracing::warn!("Missing or malformed Authorization header");
                    AppError::Auth("No token provided".into())
                })?;

        let claims = state.tokens.verify(bearer.token()).map_err(|e| {
            tracing::warn!("Token verification failed: {e}");
            e
        })?;

        Ok(claims.into())
    }
}
