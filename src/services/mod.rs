// src/services/mod.rs
pub mod auth_service;
pub mod doctor_service;
pub mod patient_service;
pub mod pdf_service;
