use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{ArtifactStore, StoreError, StoreResult, StoredArtifact};
use crate::models::artifact::ArtifactKind;

type Key = (ArtifactKind, String);

/// In-memory artifact store backed by a `HashMap<(kind, identifier), row>`.
/// Artifacts do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    rows: Mutex<HashMap<Key, StoredArtifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<Key, StoredArtifact>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn find_by_identifier(
        &self,
        kind: ArtifactKind,
        identifier: &str,
    ) -> StoreResult<Option<StoredArtifact>> {
        Ok(self.rows().get(&(kind, identifier.to_string())).cloned())
    }

    async fn insert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact> {
        let mut rows = self.rows();
        let key = (artifact.kind, artifact.identifier.clone());
        if rows.contains_key(&key) {
            return Err(StoreError::DuplicateIdentifier {
                kind: artifact.kind,
                identifier: artifact.identifier.clone(),
            });
        }
        rows.insert(key, artifact.clone());
        Ok(artifact.clone())
    }

    async fn upsert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact> {
        let mut rows = self.rows();
        let key = (artifact.kind, artifact.identifier.clone());
        let mut stored = artifact.clone();
        if let Some(existing) = rows.get(&key) {
            stored.created_at = existing.created_at;
        }
        rows.insert(key, stored.clone());
        Ok(stored)
    }
}
