//! Generation Orchestrator — the entry point for every artifact kind.
//!
//! Flow: check store → build prompt → model call (bounded by timeout) →
//!       strip fences → validate → map | degrade → persist → return record.
//!
//! At most one generation runs per (kind, identifier):
//! - inside this process, concurrent callers share one in-flight generation
//! - across processes, `ArtifactStore::insert` is insert-if-absent and the
//!   loser re-reads the winner's record
//!
//! Job matches are the exception: they are regenerated and overwritten on
//! every request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::generation::fallback;
use crate::generation::prompts::build_prompt;
use crate::generation::validator::validate;
use crate::generation::{storable, GeneratedArtifact};
use crate::llm_client::{strip_json_fences, CompletionOptions, CompletionProvider, ProviderError};
use crate::models::artifact::{
    ArtifactKind, ArtifactRecord, ArtifactResult, AtsAnalysis, GenerationRequest, JobFitAnalysis,
    JobMatches, McqSet, WritePolicy,
};
use crate::store::{ArtifactStore, StoreError, StoreResult, StoredArtifact};

type FlightKey = (ArtifactKind, String);
type Flight = Arc<OnceCell<StoredArtifact>>;
type FlightMap = HashMap<FlightKey, Flight>;

pub struct GenerationOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ArtifactStore>,
    model: String,
    timeout: Duration,
    in_flight: Mutex<FlightMap>,
}

/// Membership in an in-flight generation. The last member out removes the entry,
/// including when the caller's future is dropped mid-generation.
struct FlightGuard<'a> {
    in_flight: &'a Mutex<FlightMap>,
    key: FlightKey,
    flight: Flight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut map = lock(self.in_flight);
        let ours = map
            .get(&self.key)
            .is_some_and(|f| Arc::ptr_eq(f, &self.flight));
        // the map and this guard hold the last two references
        if ours && Arc::strong_count(&self.flight) == 2 {
            map.remove(&self.key);
        }
    }
}

fn lock(map: &Mutex<FlightMap>) -> MutexGuard<'_, FlightMap> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl GenerationOrchestrator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn ArtifactStore>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            model: model.into(),
            timeout,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn analyze_resume(
        &self,
        request: GenerationRequest,
    ) -> StoreResult<ArtifactRecord<AtsAnalysis>> {
        self.generate(request).await
    }

    pub async fn analyze_job_fit(
        &self,
        request: GenerationRequest,
    ) -> StoreResult<ArtifactRecord<JobFitAnalysis>> {
        self.generate(request).await
    }

    pub async fn recommend_jobs(
        &self,
        request: GenerationRequest,
    ) -> StoreResult<ArtifactRecord<JobMatches>> {
        self.generate(request).await
    }

    pub async fn generate_quiz(
        &self,
        request: GenerationRequest,
    ) -> StoreResult<ArtifactRecord<McqSet>> {
        self.generate(request).await
    }

    /// Generates (or returns the stored) artifact for `request.identifier`.
    ///
    /// Model and parse failures come back as a `Degraded` result, never as an
    /// error. Only storage failures other than a lost insert race are errors.
    pub async fn generate<A: GeneratedArtifact>(
        &self,
        request: GenerationRequest,
    ) -> StoreResult<ArtifactRecord<A>> {
        let guard = self.join_flight(A::KIND, &request.identifier);
        let stored = guard
            .flight
            .get_or_try_init(|| self.run::<A>(&request))
            .await?
            .clone();
        drop(guard);
        decode(stored)
    }

    /// Reads a stored artifact without generating.
    pub async fn fetch<A: GeneratedArtifact>(
        &self,
        identifier: &str,
    ) -> StoreResult<Option<ArtifactRecord<A>>> {
        self.store
            .find_by_identifier(A::KIND, identifier)
            .await?
            .map(decode)
            .transpose()
    }

    fn join_flight(&self, kind: ArtifactKind, identifier: &str) -> FlightGuard<'_> {
        let key = (kind, identifier.to_string());
        let flight = lock(&self.in_flight).entry(key.clone()).or_default().clone();
        FlightGuard {
            in_flight: &self.in_flight,
            key,
            flight,
        }
    }

    async fn run<A: GeneratedArtifact>(
        &self,
        request: &GenerationRequest,
    ) -> StoreResult<StoredArtifact> {
        let kind = A::KIND;
        let identifier = request.identifier.as_str();
        let policy = kind.write_policy();

        if policy == WritePolicy::WriteOnce {
            debug!("{kind} '{identifier}': checking store");
            if let Some(existing) = self.store.find_by_identifier(kind, identifier).await? {
                info!("{kind} '{identifier}': returning stored artifact, no model call");
                return Ok(existing);
            }
        }

        let result = self.produce::<A>(request).await;
        if result.is_degraded() {
            warn!("{kind} '{identifier}': persisting degraded artifact");
        }

        let now = Utc::now();
        let artifact = StoredArtifact {
            kind,
            identifier: identifier.to_string(),
            filename: request.filename.as_deref().map(storable),
            resume_text: storable(&request.resume_text),
            job_description: request.job_description.as_deref().map(storable),
            result: serde_json::to_value(&result)?,
            created_at: now,
            updated_at: now,
        };

        match policy {
            WritePolicy::WriteOnce => match self.store.insert(&artifact).await {
                Err(StoreError::DuplicateIdentifier { .. }) => {
                    warn!("{kind} '{identifier}': created concurrently elsewhere, returning that one");
                    self.store
                        .find_by_identifier(kind, identifier)
                        .await?
                        .ok_or_else(|| {
                            StoreError::Inconsistent(format!(
                                "{kind} '{identifier}' reported as duplicate but not found"
                            ))
                        })
                }
                other => other,
            },
            WritePolicy::Replace => self.store.upsert(&artifact).await,
        }
    }

    /// Prompt → model → sanitize → validate → map. Never fails: every failure
    /// becomes a degraded result.
    async fn produce<A: GeneratedArtifact>(&self, request: &GenerationRequest) -> ArtifactResult<A> {
        let kind = A::KIND;
        let identifier = &request.identifier;
        let prompt = build_prompt(kind, &request.resume_text, request.job_description.as_deref());
        let options =
            CompletionOptions::new(self.model.as_str()).with_response_format(A::RESPONSE_FORMAT);

        debug!("{kind} '{identifier}': generating with {}", self.model);
        let raw = match self.call_model(&prompt, &options).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{kind} '{identifier}': model call failed: {e}");
                return ArtifactResult::Degraded(fallback::from_provider_error(kind, &e));
            }
        };

        debug!("{kind} '{identifier}': validating {} bytes", raw.len());
        match validate(kind, strip_json_fences(&raw)) {
            Ok(validated) => {
                for violation in &validated.violations {
                    warn!("{kind} '{identifier}': {violation} (kept)");
                }
                ArtifactResult::Ok(A::from_validated(&validated))
            }
            Err(e) => {
                warn!("{kind} '{identifier}': unusable model output: {e}");
                ArtifactResult::Degraded(fallback::from_parse_error(kind, &e, &raw))
            }
        }
    }

    async fn call_model(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        let raw = tokio::time::timeout(self.timeout, self.provider.generate(prompt, options))
            .await
            .map_err(|_| {
                ProviderError::timeout(format!(
                    "no response from {} within {}s",
                    options.model,
                    self.timeout.as_secs()
                ))
            })??;

        if raw.trim().is_empty() {
            return Err(ProviderError::empty(format!(
                "{} returned a blank response",
                options.model
            )));
        }
        Ok(raw)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

fn decode<A: GeneratedArtifact>(stored: StoredArtifact) -> StoreResult<ArtifactRecord<A>> {
    Ok(ArtifactRecord {
        identifier: stored.identifier,
        kind: stored.kind,
        filename: stored.filename,
        resume_text: stored.resume_text,
        job_description: stored.job_description,
        result: serde_json::from_value(stored.result)?,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    })
}
