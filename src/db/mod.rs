pub mod mongo;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::models::{Created, NewSubmission, Submission};

pub use mongo::MongoStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Mongo,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Postgres => f.write_str("postgres"),
            Backend::Mongo => f.write_str("mongo"),
        }
    }
}

/// Durable storage for contact submissions.
///
/// Implementations share one connection handle across all requests and must
/// not serialize callers behind a lock. `list_all` returns newest first.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// Create the table or collection indexes if they are missing. Idempotent.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;

    async fn insert(&self, new: &NewSubmission) -> Result<Created, StorageError>;

    async fn list_all(&self) -> Result<Vec<Submission>, StorageError>;
}

pub type SharedStore = Arc<dyn SubmissionStore>;

/// Connect to the configured backend and make sure it is ready to serve.
pub async fn connect(config: &BackendConfig) -> Result<SharedStore, StorageError> {
    let store: SharedStore = match config {
        BackendConfig::Postgres { url } => Arc::new(PgStore::connect(url).await?),
        BackendConfig::Mongo { uri, database } => {
            Arc::new(MongoStore::connect(uri, database).await?)
        }
    };

    store.ping().await?;
    store.ensure_schema().await?;

    tracing::info!(backend = %store.backend(), "Storage ready");
    Ok(store)
}

#[derive(Debug)]
pub enum StorageError {
    Connection(String),
    Query(String),
    Constraint(String),
    Migration(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Connection(msg) => write!(f, "Connection error: {msg}"),
            StorageError::Query(msg) => write!(f, "Query error: {msg}"),
            StorageError::Constraint(msg) => write!(f, "Constraint violation: {msg}"),
            StorageError::Migration(msg) => write!(f, "Migration error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // SQLSTATE classes 22 (data exception) and 23 (integrity constraint)
            sqlx::Error::Database(db)
                if db.constraint().is_some()
                    || db
                        .code()
                        .is_some_and(|c| c.starts_with("22") || c.starts_with("23")) =>
            {
                StorageError::Constraint(err.to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => StorageError::Connection(err.to_string()),
            _ => StorageError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::Migration(err.to_string())
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::InvalidArgument { .. }
            | ErrorKind::Authentication { .. } => StorageError::Connection(err.to_string()),
            ErrorKind::Write(_) => StorageError::Constraint(err.to_string()),
            _ => StorageError::Query(err.to_string()),
        }
    }
}
