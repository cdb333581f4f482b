// src/web/dashboard_handlers.rs
use crate::{
    error::AppResult,
    services::patient_service,
    state::AppState,
    templates::DashboardPage,
    web::mw_auth::CurrentDoctor,
};
use askama::Template;
use axum::{
    extract::{Extension, State},
    response::Html,
};

// GET /dashboard
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(CurrentDoctor(doctor)): Extension<CurrentDoctor>,
) -> AppResult<Html<String>> {
    tracing::debug!("GET /dashboard for '{}'", doctor.username);

    let patients = patient_service::find_patients_by_doctor(&state.db_pool, doctor.id).await?;
    let page = DashboardPage {
        username: &doctor.username,
        patients: &patients,
    };
    Ok(Html(page.render()?))
}
