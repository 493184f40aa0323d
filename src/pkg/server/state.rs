use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Pool, Transaction, postgres::PgPoolOptions};

use crate::{
    conf::{StoreKind, settings},
    pkg::internal::{
        adaptors::jobs::{JobStore, MemoryJobStore, PgJobStore},
        resource::ResourceOptions,
    },
    prelude::Result,
};

pub fn db_pool() -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

#[async_trait]
pub trait GetTxn {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>>;
}

#[async_trait]
impl GetTxn for PgPool {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.begin().await?)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub resource: Arc<ResourceOptions>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        let store: Arc<dyn JobStore> = match settings.store {
            StoreKind::Postgres => Arc::new(PgJobStore::new(db_pool()?)),
            StoreKind::Memory => {
                tracing::warn!("using in-memory job store, data is lost on shutdown");
                Arc::new(MemoryJobStore::new())
            }
        };
        Ok(AppState::with_store(
            store,
            ResourceOptions {
                api_prefix: settings.api_prefix.clone(),
                always_return_data: settings.always_return_data,
            },
        ))
    }

    pub fn with_store(store: Arc<dyn JobStore>, resource: ResourceOptions) -> AppState {
        AppState {
            store,
            resource: Arc::new(resource),
        }
    }
}
