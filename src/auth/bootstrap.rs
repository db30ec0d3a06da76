//! Admin account provisioning and password checks.
//!
//! The admin is created by an explicit, idempotent bootstrap step (server
//! startup or the `bootstrap-admin` command), never by the login handler.

use chrono::Utc;

use crate::db::admin_repository::AdminRepository;
use crate::db::models::Admin;
use crate::error::AppError;

const BCRYPT_COST: u32 = 10;

/// Result of [`ensure_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyProvisioned,
}

/// Hash a password on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {e}")))
}

/// Create the admin account from the configured credentials unless one
/// already exists. Safe to run on every start.
pub async fn ensure_admin(
    repo: &dyn AdminRepository,
    email: &str,
    password: &str,
) -> Result<BootstrapOutcome, AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Admin email and password must not be empty".into(),
        ));
    }

    let admin = Admin {
        id: None,
        email: email.trim().to_string(),
        password_hash: hash_password(password).await?,
        created_at: Utc::now(),
    };

    if repo.create_if_none(admin).await? {
        tracing::info!("Provisioned admin account {}", email.trim());
        Ok(BootstrapOutcome::Created)
    } else {
        tracing::debug!("Admin account already provisioned");
        Ok(BootstrapOutcome::AlreadyProvisioned)
    }
}

/// Check login credentials, returning the matching admin.
pub async fn authenticate(
    repo: &dyn AdminRepository,
    email: &str,
    password: &str,
) -> Result<Admin, AppError> {
    let Some(admin) = repo.find_by_email(email.trim()).await? else {
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &admin.password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    Ok(admin)
}
