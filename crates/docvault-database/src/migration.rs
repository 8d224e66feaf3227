//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use docvault_core::error::{AppError, ErrorKind};

/// Apply every pending migration from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database schema is up to date");
    Ok(())
}
