// src/web/routes.rs
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    web::{auth_handlers, dashboard_handlers, mw_auth, patient_handlers},
};
use axum::{
    middleware,
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Sessions live in the application database, in their own table.
pub async fn create_session_store(db_pool: &SqlitePool) -> AppResult<SqliteStore> {
    let store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| AppError::SessionError(format!("Could not create session store: {}", e)))?;
    store.migrate().await?;
    Ok(store)
}

/// Cookie signing key from SESSION_SECRET; a random key when unset or too short.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            tracing::warn!("⚠️ SESSION_SECRET unusable ({}), using a random key: sessions end on restart", e);
            Key::generate()
        }
        None => {
            tracing::warn!("⚠️ SESSION_SECRET not set, using a random key: sessions end on restart");
            Key::generate()
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/login", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/", get(|| async { axum::response::Redirect::to("/login") }));

    // --- Routes that need a logged-in doctor ---
    let authenticated_routes = Router::new()
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/dashboard", get(dashboard_handlers::dashboard_handler))
        .route(
            "/add_patient",
            get(patient_handlers::show_add_patient_form).post(patient_handlers::handle_add_patient),
        )
        .route("/patient_pdf/{id}", get(patient_handlers::patient_pdf_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}

/// Router plus tracing and session layers: the whole HTTP application.
pub fn create_app(app_state: AppState, session_store: SqliteStore, key: Key) -> Router {
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    )
}
