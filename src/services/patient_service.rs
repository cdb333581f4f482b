// src/services/patient_service.rs
use crate::{
    error::{AppError, AppResult},
    models::patient::{NewPatient, Patient},
};
use sqlx::SqlitePool;

/// All patients of a doctor, oldest first (id ascending).
pub async fn find_patients_by_doctor(db_pool: &SqlitePool, doctor_id: i64) -> AppResult<Vec<Patient>> {
    let patients = sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, name, age, gender, symptoms, diagnosis, doctor_id, created_at
        FROM patients
        WHERE doctor_id = ?1
        ORDER BY id ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Doctor {} has {} patient(s)", doctor_id, patients.len());
    Ok(patients)
}

pub async fn find_patient_by_id(db_pool: &SqlitePool, patient_id: i64) -> AppResult<Option<Patient>> {
    let patient = sqlx::query_as::<_, Patient>(
        r#"
        SELECT id, name, age, gender, symptoms, diagnosis, doctor_id, created_at
        FROM patients
        WHERE id = ?1
        "#,
    )
    .bind(patient_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(patient)
}

/// Loads a patient for `doctor_id`: unknown id is `NotFound`, someone else's patient is `Forbidden`.
pub async fn find_owned_patient(
    db_pool: &SqlitePool,
    patient_id: i64,
    doctor_id: i64,
) -> AppResult<Patient> {
    let patient = find_patient_by_id(db_pool, patient_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !patient.is_owned_by(doctor_id) {
        tracing::warn!(
            "Doctor {} tried to access patient {} owned by doctor {}",
            doctor_id,
            patient_id,
            patient.doctor_id
        );
        return Err(AppError::Forbidden);
    }
    Ok(patient)
}

/// Inserts one patient owned by `doctor_id` and returns its id.
pub async fn create_patient(db_pool: &SqlitePool, doctor_id: i64, patient: &NewPatient) -> AppResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO patients (name, age, gender, symptoms, diagnosis, doctor_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&patient.name)
    .bind(patient.age)
    .bind(&patient.gender)
    .bind(&patient.symptoms)
    .bind(&patient.diagnosis)
    .bind(doctor_id)
    .execute(db_pool)
    .await?
    .last_insert_rowid();

    tracing::info!("✅ Patient {} created for doctor {}", id, doctor_id);
    Ok(id)
}
