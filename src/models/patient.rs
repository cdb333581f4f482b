// src/models/patient.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

/// A row of the `patients` table. Always owned by exactly one doctor.
#[derive(Debug, Clone, FromRow)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: String,
    pub symptoms: String,
    pub diagnosis: String,
    pub doctor_id: i64,
    pub created_at: NaiveDateTime,
}

impl Patient {
    /// Age as shown in pages and in the PDF ("-" when unknown).
    pub fn age_display(&self) -> String {
        self.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
    }

    pub fn is_owned_by(&self, doctor_id: i64) -> bool {
        self.doctor_id == doctor_id
    }
}

/// Raw add-patient form, exactly as posted by the browser.
/// Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub diagnosis: String,
}

/// Typed patient data, validated at the boundary before it reaches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: Option<i64>,
    pub gender: String,
    pub symptoms: String,
    pub diagnosis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientFormError {
    #[error("Age must be a whole number.")]
    InvalidAge(String),
}

impl TryFrom<PatientForm> for NewPatient {
    type Error = PatientFormError;

    fn try_from(form: PatientForm) -> Result<Self, Self::Error> {
        let age = parse_age(&form.age)?;
        // Text fields are stored as typed, empty strings included
        Ok(NewPatient {
            name: form.name,
            age,
            gender: form.gender,
            symptoms: form.symptoms,
            diagnosis: form.diagnosis,
        })
    }
}

/// Blank -> None, non-negative integer -> Some, anything else is rejected.
fn parse_age(raw: &str) -> Result<Option<i64>, PatientFormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(|age| Some(i64::from(age)))
        .map_err(|_| PatientFormError::InvalidAge(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(age: &str) -> PatientForm {
        PatientForm {
            name: "John Doe".into(),
            age: age.into(),
            gender: "M".into(),
            symptoms: "cough".into(),
            diagnosis: "flu".into(),
        }
    }

    #[test]
    fn numeric_age_is_coerced() {
        let patient = NewPatient::try_from(form(" 45 ")).unwrap();
        assert_eq!(patient.age, Some(45));
        assert_eq!(patient.name, "John Doe");
        assert_eq!(patient.diagnosis, "flu");
    }

    #[test]
    fn blank_age_is_stored_as_unknown() {
        assert_eq!(NewPatient::try_from(form("")).unwrap().age, None);
        assert_eq!(NewPatient::try_from(form("   ")).unwrap().age, None);
    }

    #[test]
    fn non_numeric_or_negative_age_is_rejected() {
        for bad in ["forty", "4.5", "-3", "45y"] {
            assert_eq!(
                NewPatient::try_from(form(bad)),
                Err(PatientFormError::InvalidAge(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn empty_text_fields_are_accepted() {
        let patient = NewPatient::try_from(PatientForm::default()).unwrap();
        assert_eq!(patient.name, "");
        assert_eq!(patient.symptoms, "");
        assert_eq!(patient.age, None);
    }

    #[test]
    fn age_display_handles_missing_age() {
        let mut patient = Patient {
            id: 1,
            name: "x".into(),
            age: None,
            gender: String::new(),
            symptoms: String::new(),
            diagnosis: String::new(),
            doctor_id: 1,
            created_at: chrono::NaiveDateTime::default(),
        };
        assert_eq!(patient.age_display(), "-");
        patient.age = Some(7);
        assert_eq!(patient.age_display(), "7");
        assert!(patient.is_owned_by(1));
        assert!(!patient.is_owned_by(2));
    }
}
