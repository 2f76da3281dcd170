/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root as reversible
/// pairs (`{version}_{name}.up.sql` / `.down.sql`) and are embedded into the
/// binary at compile time.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::migrations::{ensure_database_exists, run_migrations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///     ensure_database_exists(&url).await?;
///
///     let pool = create_pool(DatabaseConfig::from_url(url)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, migrate::Migrator, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies all pending migrations
///
/// Already-applied migrations are skipped; a failed migration aborts with
/// the error and leaves later ones unapplied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Starting database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database if it doesn't exist
///
/// Used by development setups and the integration tests. In production the
/// database is provisioned ahead of time.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
