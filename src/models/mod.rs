// src/models/mod.rs
pub mod doctor;
pub mod patient;
