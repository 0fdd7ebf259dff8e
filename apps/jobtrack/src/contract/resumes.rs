use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{timestamp, Contract};

/// Resume listing entry, without the parsed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeMetadata {
    pub id: Uuid,
    pub filename: Option<String>,
    pub content_hash: Option<String>,
    pub storage_path: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Contract for ResumeMetadata {
    const ENTITY: &'static str = "ResumeMetadata";
}

/// Full resume record as returned by upload and detail calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(flatten)]
    pub metadata: ResumeMetadata,
    pub user_id: Uuid,
    pub raw_text: Option<String>,
}

impl ResumeData {
    pub fn id(&self) -> Uuid {
        self.metadata.id
    }
}

impl Contract for ResumeData {
    const ENTITY: &'static str = "ResumeData";
}
