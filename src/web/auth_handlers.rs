// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::doctor::LoginForm,
    services::auth_service,
    state::AppState,
    templates::LoginPage,
    web::mw_auth::{CurrentDoctor, DOCTOR_ID_KEY},
};
use askama::Template;
use axum::{
    extract::{Extension, Form, State},
    response::{Html, IntoResponse, Redirect},
};
use tower_sessions::Session;

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

// GET /login
pub async fn show_login_form(session: Session) -> AppResult<impl IntoResponse> {
    if session.get::<i64>(DOCTOR_ID_KEY).await.ok().flatten().is_some() {
        tracing::debug!("GET /login: already logged in, redirecting to /dashboard");
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let html = LoginPage { error: None }.render()?;
    Ok(Html(html).into_response())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Login attempt for '{}'", form.username);

    match auth_service::authenticate(&state.db_pool, &form.username, &form.password).await? {
        Some(doctor) => {
            // New id on privilege change
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::SessionError(format!("Could not cycle id: {}", e)))?;
            session
                .insert(DOCTOR_ID_KEY, doctor.id)
                .await
                .map_err(|e| AppError::SessionError(format!("Could not write session: {}", e)))?;

            tracing::info!("✅ Doctor '{}' logged in", doctor.username);
            Ok(Redirect::to("/dashboard").into_response())
        }
        None => {
            tracing::warn!("Failed login for '{}'", form.username);
            let html = LoginPage { error: Some(INVALID_CREDENTIALS.to_string()) }.render()?;
            Ok(Html(html).into_response())
        }
    }
}

// GET /logout
pub async fn handle_logout(
    Extension(CurrentDoctor(doctor)): Extension<CurrentDoctor>,
    session: Session,
) -> AppResult<Redirect> {
    // Drops the data and the stored record, the old cookie is worthless afterwards
    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Could not delete session: {}", e)))?;

    tracing::info!("🚪 Doctor '{}' logged out", doctor.username);
    Ok(Redirect::to("/login"))
}
