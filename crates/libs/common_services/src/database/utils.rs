use crate::database::DbError;
use app_state::DatabaseSettings;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Run migrations and get a database connection pool.
///
/// # Errors
///
/// * The url in `settings` is not a valid sqlite url.
/// * The database file or its folder cannot be created.
/// * Migrations fail.
pub async fn get_db_pool(settings: &DatabaseSettings) -> color_eyre::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(settings.busy_timeout));

    if let Some(parent) = options.get_filename().parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!("Connecting to database.");
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Brings the schema up to date.
pub async fn migrate(pool: &SqlitePool) -> Result<(), DbError> {
    info!("Running database migrations.");
    sqlx::migrate!("../../../migrations").run(pool).await?;
    Ok(())
}

/// Cheap round trip used by the health check.
pub async fn ping(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
