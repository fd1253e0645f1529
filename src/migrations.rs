use diesel::Connection;
use diesel_async::{async_connection_wrapper::AsyncConnectionWrapper, AsyncPgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::store::StoreError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub async fn run_migrations(database_url: &str) -> Result<(), StoreError> {
    let database_url = database_url.to_owned();

    tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
        let mut connection = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        for version in applied {
            tracing::info!("applied migration {version}");
        }

        Ok(())
    })
    .await
    .map_err(|e| StoreError::Migration(e.to_string()))?
}
