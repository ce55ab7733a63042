use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the storage backend.
///
/// The tabular backend hands out increasing integers, the document backend
/// opaque ObjectId hex strings. Serialized untagged, so clients see either a
/// JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    Serial(i64),
    Document(String),
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Serial(id) => write!(f, "{id}"),
            SubmissionId::Document(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A validated, trimmed submission that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// What the backend assigned on insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Created {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
}
