use std::time::Instant;

use migration::{migrate, MigrationCommand};
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{sanitize_db_url, DbSettings};
use crate::error::AppError;

/// Open a pooled connection. Does NOT run migrations.
pub async fn connect_db(settings: &DbSettings) -> Result<DatabaseConnection, AppError> {
    let started = Instant::now();
    let conn = Database::connect(settings.connect_options()).await?;
    info!(
        engine = settings.kind.engine(),
        url = %sanitize_db_url(&settings.url),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "database connected"
    );
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(settings: &DbSettings) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(settings).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}
