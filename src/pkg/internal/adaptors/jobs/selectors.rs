use sqlx::PgConnection;

use crate::{pkg::internal::adaptors::jobs::spec::JobEntry, prelude::Result};


pub struct JobSelector<'a>{
    pool: &'a mut PgConnection
}

impl<'a> JobSelector<'a>{
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector{pool}
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<JobEntry>> {
        let row = sqlx::query_as::<_, JobEntry>(
            "SELECT id, name, description FROM jobs WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_all(&mut self) -> Result<Vec<JobEntry>> {
        let rows = sqlx::query_as::<_, JobEntry>(
            "SELECT id, name, description FROM jobs ORDER BY id"
        )
        .fetch_all(&mut *self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_many(&mut self, ids: &[i64]) -> Result<Vec<JobEntry>> {
        let rows = sqlx::query_as::<_, JobEntry>(
            "SELECT id, name, description FROM jobs WHERE id = ANY($1) ORDER BY array_position($1, id)"
        )
        .bind(ids)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
