// src/config.rs
use crate::error::{AppError, AppResult};
use std::env;
use std::path::PathBuf;

const DEFAULT_DATABASE_URL: &str = "sqlite://local.db";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FONT_DIR: &str = "./fonts";

/// Settings read once at startup and carried inside `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Raw key material for signing the session cookie (None = random key per process)
    pub session_secret: Option<String>,
    pub pdf_font_dir: PathBuf,
    /// Doctors created at startup when their username is not taken yet
    pub seed_doctors: Vec<SeedDoctor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDoctor {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Builds the configuration from the process environment (.env included).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, but with an injectable lookup (used by the tests).
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("invalid PORT '{}': {}", raw, e)))?,
            _ => DEFAULT_PORT,
        };

        let session_secret = lookup("SESSION_SECRET").filter(|v| !v.is_empty());

        let pdf_font_dir = lookup("PDF_FONT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_DIR));

        let seed_doctors = match lookup("SEED_DOCTORS") {
            Some(raw) => parse_seed_doctors(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            database_url,
            port,
            session_secret,
            pdf_font_dir,
            seed_doctors,
        })
    }
}

/// Parses `user:pass,user2:pass2`. Blank entries are skipped.
fn parse_seed_doctors(raw: &str) -> AppResult<Vec<SeedDoctor>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            // Password may itself contain ':' so only the first one splits
            let (username, password) = entry.split_once(':').ok_or_else(|| {
                AppError::Config(format!("SEED_DOCTORS: entry without ':': '{}'", entry))
            })?;
            let username = username.trim();
            if username.is_empty() {
                return Err(AppError::Config("SEED_DOCTORS: empty username".to_string()));
            }
            Ok(SeedDoctor {
                username: username.to_string(),
                password: password.to_string(),
            })
        })
        .collect()
}
