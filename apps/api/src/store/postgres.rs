use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use super::{ArtifactStore, StoreError, StoreResult, StoredArtifact};
use crate::models::artifact::ArtifactKind;

#[derive(Debug, FromRow)]
struct ArtifactRow {
    kind: String,
    identifier: String,
    filename: Option<String>,
    resume_text: String,
    job_description: Option<String>,
    result: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArtifactRow> for StoredArtifact {
    type Error = StoreError;

    fn try_from(row: ArtifactRow) -> Result<Self, Self::Error> {
        Ok(StoredArtifact {
            kind: row.kind.parse::<ArtifactKind>().map_err(StoreError::Inconsistent)?,
            identifier: row.identifier,
            filename: row.filename,
            resume_text: row.resume_text,
            job_description: row.job_description,
            result: row.result,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgArtifactStore {
    pool: PgPool,
}

impl PgArtifactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactStore for PgArtifactStore {
    async fn find_by_identifier(
        &self,
        kind: ArtifactKind,
        identifier: &str,
    ) -> StoreResult<Option<StoredArtifact>> {
        sqlx::query_as::<_, ArtifactRow>(
            "SELECT * FROM artifacts WHERE kind = $1 AND identifier = $2",
        )
        .bind(kind.as_str())
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?
        .map(StoredArtifact::try_from)
        .transpose()
    }

    async fn insert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact> {
        // Single statement: a concurrent writer either wins the key or sees ours.
        let row = sqlx::query_as::<_, ArtifactRow>(
            r#"
            INSERT INTO artifacts
                (kind, identifier, filename, resume_text, job_description, result, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (kind, identifier) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(artifact.kind.as_str())
        .bind(&artifact.identifier)
        .bind(&artifact.filename)
        .bind(&artifact.resume_text)
        .bind(&artifact.job_description)
        .bind(&artifact.result)
        .bind(artifact.created_at)
        .bind(artifact.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::DuplicateIdentifier {
                kind: artifact.kind,
                identifier: artifact.identifier.clone(),
            }),
        }
    }

    async fn upsert(&self, artifact: &StoredArtifact) -> StoreResult<StoredArtifact> {
        sqlx::query_as::<_, ArtifactRow>(
            r#"
            INSERT INTO artifacts
                (kind, identifier, filename, resume_text, job_description, result, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (kind, identifier) DO UPDATE
            SET filename = EXCLUDED.filename,
                resume_text = EXCLUDED.resume_text,
                job_description = EXCLUDED.job_description,
                result = EXCLUDED.result,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(artifact.kind.as_str())
        .bind(&artifact.identifier)
        .bind(&artifact.filename)
        .bind(&artifact.resume_text)
        .bind(&artifact.job_description)
        .bind(&artifact.result)
        .bind(artifact.created_at)
        .bind(artifact.updated_at)
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }
}
