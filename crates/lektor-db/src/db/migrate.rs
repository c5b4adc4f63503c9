//! Embedded schema migrations, run once at startup.

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// ## Summary
/// Runs any pending migrations against the database. Uses a short-lived
/// synchronous connection; the async pool is created afterwards.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a migration
/// fails.
pub fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    let mut conn = diesel::pg::PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow::anyhow!("Migration failed: {err}"))?;
    for version in &applied {
        tracing::info!(migration = %version, "Applied migration");
    }
    Ok(())
}
