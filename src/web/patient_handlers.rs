// src/web/patient_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::patient::{NewPatient, PatientForm},
    services::patient_service,
    state::AppState,
    templates::{AddPatientPage, PatientPdfPage},
    web::mw_auth::CurrentDoctor,
};
use askama::Template;
use axum::{
    extract::{Extension, Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

// GET /add_patient
pub async fn show_add_patient_form() -> AppResult<Html<String>> {
    let form = PatientForm::default();
    let page = AddPatientPage { form: &form, error: None };
    Ok(Html(page.render()?))
}

// POST /add_patient
pub async fn handle_add_patient(
    State(state): State<AppState>,
    Extension(CurrentDoctor(doctor)): Extension<CurrentDoctor>,
    Form(form): Form<PatientForm>,
) -> AppResult<Response> {
    let new_patient = match NewPatient::try_from(form.clone()) {
        Ok(patient) => patient,
        Err(e) => {
            tracing::warn!("Add patient rejected for '{}': {:?}", doctor.username, e);
            let page = AddPatientPage { form: &form, error: Some(e.to_string()) };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.render()?)).into_response());
        }
    };

    patient_service::create_patient(&state.db_pool, doctor.id, &new_patient).await?;
    Ok(Redirect::to("/dashboard").into_response())
}

// GET /patient_pdf/{id}
pub async fn patient_pdf_handler(
    State(state): State<AppState>,
    Extension(CurrentDoctor(doctor)): Extension<CurrentDoctor>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    // Non-numeric ids cannot exist
    let patient_id: i64 = raw_id.parse().map_err(|_| AppError::NotFound)?;
    tracing::debug!("GET /patient_pdf/{} for '{}'", patient_id, doctor.username);

    // 404 / 403 before anything gets rendered
    let patient = patient_service::find_owned_patient(&state.db_pool, patient_id, doctor.id).await?;

    let html = PatientPdfPage {
        patient: &patient,
        doctor_username: &doctor.username,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
    }
    .render()?;

    let pdf = state
        .pdf_renderer
        .render_html(format!("Patient {}", patient.id), html)
        .await?;

    tracing::info!("📄 PDF for patient {} generated ({} bytes)", patient.id, pdf.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=patient_{}.pdf", patient.id),
            ),
        ],
        pdf,
    )
        .into_response())
}
