// src/services/doctor_service.rs
use crate::{config::SeedDoctor, error::AppResult, models::doctor::Doctor, services::auth_service};
use sqlx::SqlitePool;

pub async fn find_doctor_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<Option<Doctor>> {
    tracing::debug!("Looking up doctor by username: {}", username);
    let doctor = sqlx::query_as::<_, Doctor>(
        r#"
        SELECT id, username, password, created_at
        FROM doctors
        WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await?;
    Ok(doctor)
}

pub async fn find_doctor_by_id(db_pool: &SqlitePool, doctor_id: i64) -> AppResult<Option<Doctor>> {
    let doctor = sqlx::query_as::<_, Doctor>(
        r#"
        SELECT id, username, password, created_at
        FROM doctors
        WHERE id = ?1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(doctor)
}

/// Inserts a doctor with the credential stored verbatim. Returns the new id.
pub async fn create_doctor(db_pool: &SqlitePool, username: &str, credential: &str) -> AppResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO doctors (username, password) VALUES (?1, ?2)
        "#,
    )
    .bind(username)
    .bind(credential)
    .execute(db_pool)
    .await?
    .last_insert_rowid();

    tracing::info!("✅ Doctor '{}' created with id {}", username, id);
    Ok(id)
}

/// Creates each seed doctor whose username does not exist yet, with a bcrypt
/// hashed password. Existing rows are never overwritten. Returns how many were inserted.
pub async fn seed_doctors(db_pool: &SqlitePool, seeds: &[SeedDoctor]) -> AppResult<usize> {
    let mut inserted = 0;
    for seed in seeds {
        if find_doctor_by_username(db_pool, &seed.username).await?.is_some() {
            tracing::debug!("Seed: doctor '{}' already exists, skipping", seed.username);
            continue;
        }

        let password_hash = auth_service::hash_password(&seed.password).await?;
        let rows = sqlx::query(
            r#"
            INSERT OR IGNORE INTO doctors (username, password) VALUES (?1, ?2)
            "#,
        )
        .bind(&seed.username)
        .bind(&password_hash)
        .execute(db_pool)
        .await?
        .rows_affected();
        inserted += rows as usize;
    }

    if inserted > 0 {
        tracing::info!("🌱 Seeded {} doctor(s)", inserted);
    }
    Ok(inserted)
}
