use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::auth::bootstrap::authenticate;
use crate::auth::models::{LoginRequest, LoginResponse};
use crate::error::AppError;

/// `POST /api/auth/login`
///
/// Exchanges admin credentials for a bearer token. Never creates accounts.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let admin = authenticate(state.admin_repo.as_ref(), &request.email, &request.password)
        .await
        .inspect_err(|_| tracing::warn!("Failed login attempt for {}", request.email.trim()))?;

    let admin_id = admin
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| AppError::Internal("Stored admin has no id".into()))?;
    let token = state.tokens.issue(&admin_id, &admin.email)?;

    tracing::info!("Admin {} logged in", admin.email);
    Ok(Json(LoginResponse {
        token,
        email: admin.email,
    }))
}
