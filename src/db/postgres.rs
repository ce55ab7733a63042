use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::models::{Created, NewSubmission, Submission, SubmissionId};

use super::{Backend, StorageError, SubmissionStore};

/// Submissions kept in a PostgreSQL table with a `BIGSERIAL` identity.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    name: String,
    email: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            id: SubmissionId::Serial(row.id),
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn insert(&self, new: &NewSubmission) -> Result<Created, StorageError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO submissions (name, email, message)
             VALUES ($1, $2, $3) RETURNING id, created_at",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(Created {
            id: SubmissionId::Serial(id),
            created_at,
        })
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StorageError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            "SELECT id, name, email, message, created_at FROM submissions
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }
}
