//! Fixture backend
//!
//! Serves `<dir>/<path>.json` for collections. Used for offline seed data and
//! in tests; it never accepts writes.

use super::{QueryParams, SourceBackend};
use crate::config::SourceConfig;
use crate::error::{Operation, SourceError};
use async_trait::async_trait;
use serde_json::Value;
use shop_model::{raw_entries, RecordId, Resource};
use std::path::{Path, PathBuf};

/// Read-only JSON fixture backend
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    config: SourceConfig,
}

impl FileBackend {
    /// Create backend rooted at `root`
    #[must_use]
    pub fn new(root: impl AsRef<Path>, config: SourceConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Fixture file for a resource
    #[must_use]
    pub fn file(&self, resource: Resource) -> PathBuf {
        self.root.join(format!("{}.json", self.config.path(resource)))
    }

    fn read_only(&self, operation: Operation) -> SourceError {
        SourceError::Unsupported {
            backend: format!("fixture source {}", self.config.name),
            operation,
        }
    }
}

#[async_trait]
impl SourceBackend for FileBackend {
    async fn list(&self, resource: Resource, _query: &QueryParams) -> Result<Value, SourceError> {
        let path = self.file(resource);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            url: path.display().to_string(),
            message: e.to_string(),
        })
    }

    async fn get(&self, resource: Resource, id: &RecordId) -> Result<Value, SourceError> {
        let all = self.list(resource, &[]).await?;
        raw_entries(&all, resource)
            .into_iter()
            .find(|entry| entry.get("id").and_then(RecordId::from_json).as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                url: format!("{}#{id}", self.file(resource).display()),
            })
    }

    async fn create(&self, _resource: Resource, _body: &Value) -> Result<Value, SourceError> {
        Err(self.read_only(Operation::Create))
    }

    async fn update(
        &self,
        _resource: Resource,
        _id: &RecordId,
        _body: &Value,
    ) -> Result<Value, SourceError> {
        Err(self.read_only(Operation::Update))
    }

    async fn delete(&self, _resource: Resource, _id: &RecordId) -> Result<(), SourceError> {
        Err(self.read_only(Operation::Delete))
    }
}
