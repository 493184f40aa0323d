use jobs_api::{conf::settings, pkg::server::state::GetTxn, prelude::Result};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");


pub async fn apply() -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&settings.database_url)
        .await?;

    tracing::debug!("connected to db");
    let mut tx = pool.begin_txn().await?;
    MIGRATOR.run(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("migrations applied successfully");
    Ok(())
}
