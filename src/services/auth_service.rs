// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::doctor::Doctor,
    services::doctor_service,
};
use sqlx::SqlitePool;

/// Looks the doctor up and checks the password. `Ok(None)` covers both an
/// unknown username and a wrong password so callers cannot tell them apart.
pub async fn authenticate(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Option<Doctor>> {
    let Some(doctor) = doctor_service::find_doctor_by_username(db_pool, username).await? else {
        tracing::debug!("Login: username '{}' not found", username);
        return Ok(None);
    };

    if verify_credential(password, &doctor.password).await? {
        Ok(Some(doctor))
    } else {
        tracing::debug!("Login: wrong password for '{}'", username);
        Ok(None)
    }
}

/// Compares a submitted password with the stored credential.
///
/// Bcrypt hashes are verified with bcrypt. Anything else is a legacy
/// plaintext credential and is compared by plain equality; that path is
/// logged as a warning every time it is taken and the row is left untouched.
pub async fn verify_credential(password: &str, stored: &str) -> AppResult<bool> {
    if is_bcrypt_hash(stored) {
        return verify_password(password, stored).await;
    }

    tracing::warn!("⚠️ Stored credential is plaintext (not hashed); comparing by equality");
    Ok(password == stored)
}

pub fn is_bcrypt_hash(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| stored.starts_with(prefix))
        && stored.len() == 60
}

/// Checks the password against a bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while verifying password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Produces a bcrypt hash for a new credential.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while hashing password: {:?}", e);
        AppError::PasswordHashingError
    })
}
