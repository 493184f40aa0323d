pub mod memory;
pub mod mutators;
pub mod selectors;
pub mod spec;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{pkg::server::state::GetTxn, prelude::Result};
use mutators::JobMutator;
use selectors::JobSelector;
use spec::{JobEntry, JobPatch, NewJob, next_id_after};

pub use memory::MemoryJobStore;

/// Persistence seam for the job resource.
///
/// Every mutating call is atomic: it either applies fully or leaves the
/// store untouched.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs in ascending id order.
    async fn list(&self) -> Result<Vec<JobEntry>>;
    async fn get(&self, id: i64) -> Result<Option<JobEntry>>;
    /// Jobs whose id is in `ids`, in the order of `ids`; missing ids are skipped.
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<JobEntry>>;
    async fn create(&self, job: NewJob) -> Result<JobEntry>;
    /// Overwrites job `id`, creating it under that id when absent.
    /// The flag is `true` when a row was created. Ids without a successor
    /// are rejected before anything is written.
    async fn replace(&self, id: i64, job: NewJob) -> Result<(JobEntry, bool)>;
    async fn update(&self, id: i64, patch: JobPatch) -> Result<Option<JobEntry>>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn delete_all(&self) -> Result<u64>;
    /// Drops the whole collection and recreates it from `jobs`.
    async fn replace_all(&self, jobs: Vec<NewJob>) -> Result<Vec<JobEntry>>;
    async fn ping(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        PgJobStore { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn list(&self) -> Result<Vec<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        JobSelector::new(&mut *conn).get_all().await
    }

    async fn get(&self, id: i64) -> Result<Option<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        JobSelector::new(&mut *conn).get_by_id(id).await
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        JobSelector::new(&mut *conn).get_many(ids).await
    }

    async fn create(&self, job: NewJob) -> Result<JobEntry> {
        let mut tx = self.pool.begin_txn().await?;
        let row = JobMutator::new(&mut *tx).create(&job).await?;
        tx.commit().await?;
        tracing::debug!(id = row.id, "job created");
        Ok(row)
    }

    async fn replace(&self, id: i64, job: NewJob) -> Result<(JobEntry, bool)> {
        next_id_after(id)?;
        let mut tx = self.pool.begin_txn().await?;
        let mut mutator = JobMutator::new(&mut *tx);
        let (row, created) = mutator.upsert(id, &job).await?;
        if created {
            mutator.resync_sequence().await?;
        }
        tx.commit().await?;
        Ok((row, created))
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Option<JobEntry>> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        let mut tx = self.pool.begin_txn().await?;
        let row = JobMutator::new(&mut *tx).update(id, patch).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin_txn().await?;
        let deleted = JobMutator::new(&mut *tx).delete(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut tx = self.pool.begin_txn().await?;
        let deleted = JobMutator::new(&mut *tx).delete_all().await?;
        tx.commit().await?;
        tracing::info!(deleted, "job collection cleared");
        Ok(deleted)
    }

    async fn replace_all(&self, jobs: Vec<NewJob>) -> Result<Vec<JobEntry>> {
        let mut tx = self.pool.begin_txn().await?;
        let mut mutator = JobMutator::new(&mut *tx);
        mutator.delete_all().await?;
        let mut rows = Vec::with_capacity(jobs.len());
        for job in &jobs {
            rows.push(mutator.create(job).await?);
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }
}
