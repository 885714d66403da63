//! Object metadata records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a single stored object, as yielded by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// `/`-delimited key, unique within its bucket.
    pub key: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification time, if the listing reported one.
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectRecord {
    /// Create a record with a modification time.
    pub fn new(key: impl Into<String>, size: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: Some(last_modified),
        }
    }

    /// Create a record without a modification time.
    pub fn untimed(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }

    /// Final `/`-delimited segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or_default()
    }

    /// Text before the first `/`, or the whole key.
    pub fn top_level(&self) -> &str {
        self.key.split('/').next().unwrap_or_default()
    }

    /// Second `/`-delimited segment, present only when the key has one.
    pub fn second_level(&self) -> Option<&str> {
        self.key.split('/').nth(1)
    }
}

/// A sampled key kept verbatim in the bucket summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSample {
    pub key: String,
    pub size: u64,
}

impl From<&ObjectRecord> for ObjectSample {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            key: record.key.clone(),
            size: record.size,
        }
    }
}
