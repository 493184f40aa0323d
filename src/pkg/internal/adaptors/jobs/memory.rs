use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::JobStore;
use super::spec::{JobEntry, JobPatch, NewJob, next_id_after};
use crate::prelude::{Error, Result};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, JobEntry>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn insert(&mut self, job: NewJob) -> Result<JobEntry> {
        let id = self.next_id;
        self.insert_with_id(id, job)
    }

    /// Leaves the table untouched when `id` has no successor.
    fn insert_with_id(&mut self, id: i64, job: NewJob) -> Result<JobEntry> {
        let next = next_id_after(id)?;
        let entry = job.into_entry(id);
        self.rows.insert(id, entry.clone());
        self.next_id = self.next_id.max(next);
        Ok(entry)
    }
}

/// In-process job table.
///
/// Intended for tests/dev. Ids are never reused within one store, matching
/// a database sequence.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    table: RwLock<Table>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> Result<T> {
        let table = self
            .table
            .read()
            .map_err(|_| Error::Store("lock poisoned".to_string()))?;
        Ok(f(&table))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Table) -> Result<T>) -> Result<T> {
        let mut table = self
            .table
            .write()
            .map_err(|_| Error::Store("lock poisoned".to_string()))?;
        f(&mut table)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list(&self) -> Result<Vec<JobEntry>> {
        self.read(|t| t.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<JobEntry>> {
        self.read(|t| t.rows.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<JobEntry>> {
        self.read(|t| ids.iter().filter_map(|id| t.rows.get(id)).cloned().collect())
    }

    async fn create(&self, job: NewJob) -> Result<JobEntry> {
        self.write(|t| t.insert(job))
    }

    async fn replace(&self, id: i64, job: NewJob) -> Result<(JobEntry, bool)> {
        self.write(|t| {
            let created = !t.rows.contains_key(&id);
            Ok((t.insert_with_id(id, job)?, created))
        })
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Option<JobEntry>> {
        self.write(|t| {
            Ok(t.rows.get_mut(&id).map(|row| {
                patch.apply(row);
                row.clone()
            }))
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.write(|t| Ok(t.rows.remove(&id).is_some()))
    }

    async fn delete_all(&self) -> Result<u64> {
        self.write(|t| {
            let n = t.rows.len() as u64;
            t.rows.clear();
            Ok(n)
        })
    }

    async fn replace_all(&self, jobs: Vec<NewJob>) -> Result<Vec<JobEntry>> {
        self.write(|t| {
            // the last id handed out must still have a successor
            let count = i64::try_from(jobs.len())
                .map_err(|_| Error::bad_request("Too many objects."))?;
            t.next_id
                .checked_add(count)
                .ok_or_else(|| Error::bad_request("The id range is exhausted."))?;
            t.rows.clear();
            jobs.into_iter().map(|job| t.insert(job)).collect()
        })
    }

    async fn ping(&self) -> Result<()> {
        self.read(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> NewJob {
        NewJob {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order_and_not_reused() {
        let store = MemoryJobStore::new();
        let a = store.create(job("a")).await.unwrap();
        let b = store.create(job("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.create(job("c")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn replace_creates_under_given_id_and_advances_counter() {
        let store = MemoryJobStore::new();
        let (row, created) = store.replace(10, job("ten")).await.unwrap();
        assert!(created);
        assert_eq!(row.id, 10);

        let (row, created) = store.replace(10, job("TEN")).await.unwrap();
        assert!(!created);
        assert_eq!(row.name, "TEN");

        assert_eq!(store.create(job("next")).await.unwrap().id, 11);
    }

    #[tokio::test]
    async fn replace_at_top_of_range_is_rejected_without_side_effects() {
        let store = MemoryJobStore::new();
        store.create(job("a")).await.unwrap();

        let err = store.replace(i64::MAX, job("max")).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        assert_eq!(store.get(i64::MAX).await.unwrap(), None);
        assert_eq!(store.create(job("b")).await.unwrap().id, 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_missing_row_is_none() {
        let store = MemoryJobStore::new();
        let patch = JobPatch {
            name: Some("x".into()),
            description: None,
        };
        assert_eq!(store.update(5, patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_many_skips_unknown_ids() {
        let store = MemoryJobStore::new();
        for name in ["a", "b", "c"] {
            store.create(job(name)).await.unwrap();
        }
        let rows = store.get_many(&[3, 1, 42]).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn replace_all_swaps_collection() {
        let store = MemoryJobStore::new();
        store.create(job("old")).await.unwrap();
        let rows = store
            .replace_all(vec![job("x"), job("y")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
    }
}
