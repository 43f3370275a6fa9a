//! Database connection and idempotent schema setup.

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::Config;

/// Opens the connection pool. Connections are established on first use, so
/// this succeeds even while the database is unreachable.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .connect_lazy(true)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Creates the `tasks` table if it does not exist yet.
///
/// Running it against an initialized database is a no-op.
#[tracing::instrument(skip(db))]
pub async fn initialize_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    migration::Migrator::up(db, None).await
}
