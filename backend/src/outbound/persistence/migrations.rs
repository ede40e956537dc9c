//! Embedded schema migrations, applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::pool::PoolError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply any pending migrations over a blocking connection.
///
/// Runs before the async pool is built, so a failed migration keeps the
/// server from starting.
///
/// # Errors
/// Returns [`PoolError::Build`] when connecting or migrating fails.
pub fn run_pending_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(format!("migration connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolError::build(format!("migration failed: {err}")))?;
    Ok(())
}
