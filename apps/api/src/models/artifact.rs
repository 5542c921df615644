use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four artifact kinds the service can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    AtsAnalysis,
    JobFit,
    JobMatches,
    SkillQuiz,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::AtsAnalysis => "ats_analysis",
            ArtifactKind::JobFit => "job_fit",
            ArtifactKind::JobMatches => "job_matches",
            ArtifactKind::SkillQuiz => "skill_quiz",
        }
    }

    /// How a stored artifact of this kind reacts to a repeated request.
    pub fn write_policy(&self) -> WritePolicy {
        match self {
            ArtifactKind::JobMatches => WritePolicy::Replace,
            _ => WritePolicy::WriteOnce,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ats_analysis" => Ok(ArtifactKind::AtsAnalysis),
            "job_fit" => Ok(ArtifactKind::JobFit),
            "job_matches" => Ok(ArtifactKind::JobMatches),
            "skill_quiz" => Ok(ArtifactKind::SkillQuiz),
            other => Err(format!("unknown artifact kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// First generation wins; later requests return the stored record.
    WriteOnce,
    /// Every request regenerates and overwrites (last writer wins).
    Replace,
}

/// A single generation request. Transient: built by the caller, consumed once.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Caller-supplied idempotency key, unique per (kind, subject).
    pub identifier: String,
    pub resume_text: String,
    pub job_description: Option<String>,
    pub filename: Option<String>,
}

impl GenerationRequest {
    pub fn new(identifier: impl Into<String>, resume_text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            resume_text: resume_text.into(),
            job_description: None,
            filename: None,
        }
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        self.job_description = Some(job_description.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifacts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub candidate_name: Option<String>,
    pub job_title: Option<String>,
    pub contact_info: ContactInfo,
    pub professional_summary: Option<String>,
    /// Always within 0..=100.
    pub ats_compatibility_score: u8,
    /// Expected length 3.
    pub strengths: Vec<String>,
    /// Expected length 3.
    pub weaknesses: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFitAnalysis {
    pub candidate_name: Option<String>,
    pub job_title: Option<String>,
    pub contact_info: ContactInfo,
    /// Always within 0..=100.
    pub job_fit_score: u8,
    /// Expected length 3.
    pub strengths: Vec<String>,
    pub gap_summary: Option<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecommendation {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    /// Free-text compensation range, e.g. "₹18L - ₹25L".
    pub package: Option<String>,
    pub skills_required: Vec<String>,
    /// Always within 0..=100.
    pub match_score: u8,
    pub apply_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMatches {
    /// Expected length 6, in the order the model returned them.
    pub jobs: Vec<JobRecommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqItem {
    pub question: String,
    /// Expected length 4.
    pub options: Vec<String>,
    pub answer: String,
}

impl McqItem {
    pub fn answer_is_an_option(&self) -> bool {
        self.options.iter().any(|o| o == &self.answer)
    }
}

/// An item whose answer is not one of its options. Kept in the set, flagged here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqViolation {
    pub index: usize,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqSet {
    /// Expected length 10.
    pub mcqs: Vec<McqItem>,
    #[serde(default)]
    pub violations: Vec<McqViolation>,
}

/// Placeholder produced when the model call or parsing fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedArtifact {
    pub error: String,
    pub detail: Option<String>,
    pub raw_text: Option<String>,
}

/// Outcome of one generation: the requested artifact, or its failure variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ArtifactResult<T> {
    Ok(T),
    Degraded(DegradedArtifact),
}

impl<T> ArtifactResult<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ArtifactResult::Degraded(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            ArtifactResult::Ok(value) => Some(value),
            ArtifactResult::Degraded(_) => None,
        }
    }

    pub fn degraded(&self) -> Option<&DegradedArtifact> {
        match self {
            ArtifactResult::Ok(_) => None,
            ArtifactResult::Degraded(d) => Some(d),
        }
    }
}

/// A persisted artifact as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord<T> {
    pub identifier: String,
    pub kind: ArtifactKind,
    pub filename: Option<String>,
    pub resume_text: String,
    pub job_description: Option<String>,
    pub result: ArtifactResult<T>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields document rendering reads from an ATS analysis. Layout is not our concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsReportView {
    pub ats_compatibility_score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

impl From<&AtsAnalysis> for AtsReportView {
    fn from(analysis: &AtsAnalysis) -> Self {
        Self {
            ats_compatibility_score: analysis.ats_compatibility_score,
            strengths: analysis.strengths.clone(),
            weaknesses: analysis.weaknesses.clone(),
            improvement_suggestions: analysis.improvement_suggestions.clone(),
        }
    }
}
