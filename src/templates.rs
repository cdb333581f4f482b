// src/templates.rs
use crate::models::patient::{Patient, PatientForm};
use askama::Template;

// Struct for `login.html` (templates/ folder)
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    // Generic error shown above the form
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub username: &'a str,
    pub patients: &'a [Patient],
}

#[derive(Template)]
#[template(path = "add_patient.html")]
pub struct AddPatientPage<'a> {
    // Values typed so far, so a rejected form is not lost
    pub form: &'a PatientForm,
    pub error: Option<String>,
}

/// HTML fed to the PDF renderer, not served to browsers.
#[derive(Template)]
#[template(path = "patient_pdf.html")]
pub struct PatientPdfPage<'a> {
    pub patient: &'a Patient,
    pub doctor_username: &'a str,
    pub generated_at: String,
}
