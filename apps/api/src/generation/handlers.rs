//! Axum route handlers for the artifact API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::GeneratedArtifact;
use crate::models::artifact::{
    ArtifactRecord, ArtifactResult, AtsAnalysis, AtsReportView, GenerationRequest,
    JobFitAnalysis, JobMatches, McqSet,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    /// Caller-chosen idempotency key.
    pub id: String,
    pub extracted_text: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, alias = "job_description_text")]
    pub job_description: Option<String>,
}

impl GenerateBody {
    fn into_request(self) -> Result<GenerationRequest, AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation("id cannot be empty".to_string()));
        }
        if self.id.contains('\0') {
            return Err(AppError::Validation("id cannot contain NUL characters".to_string()));
        }
        let mut request = GenerationRequest::new(self.id, self.extracted_text);
        if let Some(jd) = self.job_description {
            request = request.with_job_description(jd);
        }
        if let Some(filename) = self.filename {
            request = request.with_filename(filename);
        }
        Ok(request)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
///
/// Returns the stored ATS analysis for `id` if one exists, otherwise generates it.
/// A failed generation still answers 200 with a degraded result.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ArtifactRecord<AtsAnalysis>>, AppError> {
    let record = state.orchestrator.analyze_resume(body.into_request()?).await?;
    Ok(Json(record))
}

/// GET /api/v1/resume/analysis/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactRecord<AtsAnalysis>>, AppError> {
    fetch_or_404(&state, &id).await.map(Json)
}

/// GET /api/v1/resume/analysis/:id/report
///
/// The subset of an ATS analysis that document rendering reads.
/// A degraded analysis has nothing to render: 422.
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AtsReportView>, AppError> {
    let record = fetch_or_404::<AtsAnalysis>(&state, &id).await?;
    match &record.result {
        ArtifactResult::Ok(analysis) => Ok(Json(AtsReportView::from(analysis))),
        ArtifactResult::Degraded(degraded) => Err(AppError::UnprocessableEntity(format!(
            "ATS analysis '{id}' did not complete: {}",
            degraded.error
        ))),
    }
}

/// POST /api/v1/analysis/job-fit
pub async fn handle_analyze_job_fit(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ArtifactRecord<JobFitAnalysis>>, AppError> {
    let has_jd = body
        .job_description
        .as_deref()
        .is_some_and(|jd| !jd.trim().is_empty());
    if !has_jd {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let record = state.orchestrator.analyze_job_fit(body.into_request()?).await?;
    Ok(Json(record))
}

/// GET /api/v1/analysis/job-fit/:id
pub async fn handle_get_job_fit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactRecord<JobFitAnalysis>>, AppError> {
    fetch_or_404(&state, &id).await.map(Json)
}

/// POST /api/v1/jobs/match
///
/// Always regenerates; the new list replaces any stored one.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ArtifactRecord<JobMatches>>, AppError> {
    let record = state.orchestrator.recommend_jobs(body.into_request()?).await?;
    Ok(Json(record))
}

/// GET /api/v1/jobs/match/:id
pub async fn handle_get_job_matches(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactRecord<JobMatches>>, AppError> {
    fetch_or_404(&state, &id).await.map(Json)
}

/// POST /api/v1/quiz/generate
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ArtifactRecord<McqSet>>, AppError> {
    let record = state.orchestrator.generate_quiz(body.into_request()?).await?;
    Ok(Json(record))
}

/// GET /api/v1/quiz/:id
pub async fn handle_get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactRecord<McqSet>>, AppError> {
    fetch_or_404(&state, &id).await.map(Json)
}

async fn fetch_or_404<A: GeneratedArtifact>(
    state: &AppState,
    id: &str,
) -> Result<ArtifactRecord<A>, AppError> {
    state
        .orchestrator
        .fetch::<A>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{id}' not found", A::KIND)))
}
