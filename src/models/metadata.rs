use serde::{Deserialize, Serialize};

use crate::models::TagSet;

/// Sidecar record persisted next to each classified document. Fully
/// recomputed and overwritten on every run, never merged with a prior
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl MetadataRecord {
    pub fn new(title: impl Into<String>, tags: TagSet) -> Self {
        Self {
            title: title.into(),
            tags,
            source_path: None,
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}
