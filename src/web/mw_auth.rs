// src/web/mw_auth.rs
use crate::{error::AppError, models::doctor::Doctor, services::doctor_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the logged-in doctor's id.
pub const DOCTOR_ID_KEY: &str = "doctor_id";

/// Doctor resolved from the session, handed to protected handlers as an extension.
#[derive(Clone, Debug)]
pub struct CurrentDoctor(pub Doctor);

// Middleware that only lets requests with a valid session through
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let doctor_id = session
        .get::<i64>(DOCTOR_ID_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Could not read session: {}", e)))?;

    let Some(doctor_id) = doctor_id else {
        tracing::debug!("Auth MW: no session, redirecting {} to /login", request.uri());
        return Ok(Redirect::to("/login").into_response());
    };

    match doctor_service::find_doctor_by_id(&state.db_pool, doctor_id).await? {
        Some(doctor) => {
            tracing::debug!("Auth MW: doctor '{}' authenticated", doctor.username);
            request.extensions_mut().insert(CurrentDoctor(doctor));
            Ok(next.run(request).await)
        }
        None => {
            // Session points at a doctor that no longer exists
            tracing::warn!("Auth MW: session for unknown doctor {}, dropping it", doctor_id);
            session
                .flush()
                .await
                .map_err(|e| AppError::SessionError(format!("Could not flush session: {}", e)))?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}
