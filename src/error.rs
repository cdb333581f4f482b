// src/error.rs
use crate::services::pdf_service::PdfError;
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Password hashing error")]
    PasswordHashingError,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),

    // Patient exists but belongs to another doctor
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("PDF generation failed: {0}")]
    PdfGeneration(#[from] PdfError),

    #[error("Unexpected internal error")]
    InternalServerError,
}

impl AppError {
    /// Status code and the fixed message shown to the client.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Unauthorized"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Patient not found."),
            AppError::PdfGeneration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PDF generation error"),
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not access the data.")
            }
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error."),
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not process credentials.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not manage your session.")
            }
            AppError::TemplateError(_) | AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, user_message) = self.status_and_message();

        // Client errors are expected traffic, only server errors get logged as such
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Error {status_code}</h1><p>{message}</p><a href="/dashboard">Back</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::Forbidden.status_and_message().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.status_and_message().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PdfGeneration(PdfError::Render("boom".into())).status_and_message(),
            (StatusCode::INTERNAL_SERVER_ERROR, "PDF generation error")
        );
        assert_eq!(
            AppError::SqlxError(sqlx::Error::RowNotFound).status_and_message().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn response_does_not_leak_details() {
        let response = AppError::Config("DATABASE_URL=secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Configuration error."));
        assert!(!body.contains("secret"));
    }
}
