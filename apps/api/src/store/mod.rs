//! Artifact persistence.
//!
//! `ArtifactStore` is the only seam the orchestrator writes through:
//! - `PgArtifactStore`: Postgres, `(kind, identifier)` primary key
//! - `MemoryArtifactStore`: process-local map, for tests and runs without a database
//!
//! `insert` is an atomic insert-if-absent and fails with `DuplicateIdentifier`
//! when another writer got there first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::artifact::ArtifactKind;

pub mod memory;
pub mod postgres;

pub use memory::MemoryArtifactStore;
pub use postgres::PgArtifactStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact {kind}/{identifier} already exists")]
    DuplicateIdentifier {
        kind: ArtifactKind,
        identifier: String,
    },

    #[error("inconsistent store: {0}")]
    Inconsistent(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("artifact payload could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An artifact row with its result still in JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact {
    pub kind: ArtifactKind,
    pub identifier: String,
    pub filename: Option<String>,
    /// Inputs the artifact was generated from.
    pub resume_text: String,
    pub job_description: Option<String>,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn find_by_identifier(
        &self,
        kind: ArtifactKind,
        identifier: &str,
    ) -> StoreResult<Option<StoredArtifact>>;

    /// Inserts only if no artifact exists for `(kind, identifier)`.
    /// Returns the row as stored.
    async fn insert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact>;

    /// Inserts or overwrites. `created_at` of an existing row is kept.
    async fn upsert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact>;
}
