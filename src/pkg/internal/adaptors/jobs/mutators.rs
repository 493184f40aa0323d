use sqlx::{FromRow, PgConnection};
use crate::pkg::internal::adaptors::jobs::spec::{JobEntry, JobPatch, NewJob};
use crate::prelude::Result;


#[derive(FromRow)]
struct UpsertedJob {
    id: i64,
    name: String,
    description: Option<String>,
    created: bool,
}

pub struct JobMutator<'a>{
    pool: &'a mut PgConnection
}

impl<'a> JobMutator<'a>{
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator{pool}
    }

    pub async fn create(&mut self, job: &NewJob) -> Result<JobEntry> {
        let row = sqlx::query_as::<_, JobEntry>(
            r#"
            INSERT INTO jobs (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#
        )
        .bind(&job.name)
        .bind(&job.description)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Writes job `id` whether or not it exists. `created` is read off the
    /// row's `xmax`, which is zero only for a freshly inserted tuple.
    pub async fn upsert(&mut self, id: i64, job: &NewJob) -> Result<(JobEntry, bool)> {
        let row = sqlx::query_as::<_, UpsertedJob>(
            r#"
            INSERT INTO jobs (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, description = EXCLUDED.description
            RETURNING id, name, description, (xmax = 0) AS created
            "#
        )
        .bind(id)
        .bind(&job.name)
        .bind(&job.description)
        .fetch_one(&mut *self.pool)
        .await?;
        let entry = JobEntry { id: row.id, name: row.name, description: row.description };
        Ok((entry, row.created))
    }

    /// Moves the id sequence past the largest stored id.
    pub async fn resync_sequence(&mut self) -> Result<()> {
        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('jobs', 'id'), GREATEST((SELECT MAX(id) FROM jobs), 1))"
        )
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&mut self, id: i64, job: JobPatch) -> Result<Option<JobEntry>> {
        let mut query = String::from("UPDATE jobs SET id = id");
        let mut param_count = 1;

        if job.name.is_some() {
            param_count += 1;
            query.push_str(&format!(", name = ${}", param_count));
        }
        if job.description.is_some() {
            param_count += 1;
            query.push_str(&format!(", description = ${}", param_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, name, description");

        let mut q = sqlx::query_as::<_, JobEntry>(&query).bind(id);

        if let Some(name) = job.name {
            q = q.bind(name);
        }
        if let Some(desc) = job.description {
            q = q.bind(desc);
        }
        let row = q.fetch_optional(&mut *self.pool).await?;
        Ok(row)
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs")
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
