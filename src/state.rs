// src/state.rs
use crate::services::pdf_service::PdfRenderer;
use sqlx::SqlitePool;

/// Everything a handler needs, built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub pdf_renderer: PdfRenderer,
}

// Allows extracting the DB pool directly
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

