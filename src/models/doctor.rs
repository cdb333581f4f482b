// src/models/doctor.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

/// A row of the `doctors` table. The authenticated principal.
#[derive(Debug, Clone, FromRow)]
pub struct Doctor {
    pub id: i64,
    pub username: String,
    // Either a bcrypt hash or a legacy plaintext value (see auth_service)
    pub password: String,
    pub created_at: NaiveDateTime,
}

// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
