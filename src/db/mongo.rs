use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, doc};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use crate::models::{Created, NewSubmission, Submission, SubmissionId};

use super::{Backend, StorageError, SubmissionStore};

const COLLECTION: &str = "submissions";

/// Submissions kept in a MongoDB collection; ids are generated ObjectIds.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmissionDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    message: String,
    created_at: bson::DateTime,
}

impl TryFrom<SubmissionDoc> for Submission {
    type Error = StorageError;

    fn try_from(doc: SubmissionDoc) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .ok_or_else(|| StorageError::Query("Document without _id".to_string()))?;
        Ok(Submission {
            id: SubmissionId::Document(id.to_hex()),
            name: doc.name,
            email: doc.email,
            message: doc.message,
            created_at: from_bson_datetime(doc.created_at)?,
        })
    }
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self::from_client(client, database))
    }

    pub fn from_client(client: Client, database: &str) -> Self {
        Self {
            client,
            database: database.to_string(),
        }
    }

    fn collection(&self) -> Collection<SubmissionDoc> {
        self.client.database(&self.database).collection(COLLECTION)
    }
}

#[async_trait]
impl SubmissionStore for MongoStore {
    fn backend(&self) -> Backend {
        Backend::Mongo
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        let index = IndexModel::builder()
            .keys(doc! { "created_at": -1, "_id": -1 })
            .build();
        self.collection().create_index(index).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn insert(&self, new: &NewSubmission) -> Result<Created, StorageError> {
        // BSON dates carry millisecond precision; truncate so the returned
        // timestamp matches what a later read yields.
        let now = Utc::now();
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        let document = SubmissionDoc {
            id: None,
            name: new.name.clone(),
            email: new.email.clone(),
            message: new.message.clone(),
            created_at: bson::DateTime::from_millis(created_at.timestamp_millis()),
        };

        let result = self.collection().insert_one(&document).await?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        };

        Ok(Created {
            id: SubmissionId::Document(id),
            created_at,
        })
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StorageError> {
        let mut options = FindOptions::default();
        options.sort = Some(doc! { "created_at": -1, "_id": -1 });

        let cursor = self
            .collection()
            .find(doc! {})
            .with_options(options)
            .await?;

        let docs: Vec<SubmissionDoc> = cursor.try_collect().await?;
        docs.into_iter().map(Submission::try_from).collect()
    }
}

fn from_bson_datetime(value: bson::DateTime) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
        .ok_or_else(|| StorageError::Query(format!("created_at out of range: {value}")))
}
