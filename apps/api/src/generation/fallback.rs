//! Degraded artifacts — the structurally valid stand-in returned when the
//! model call or parsing fails.

use crate::generation::storable;
use crate::generation::validator::ParseError;
use crate::llm_client::{ProviderError, ProviderErrorKind};
use crate::models::artifact::{ArtifactKind, DegradedArtifact};

pub const EMPTY_RESPONSE_MESSAGE: &str = "No response text received from Gemini";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON returned by Gemini";

fn failure_message(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::AtsAnalysis => "Failed to analyze resume",
        ArtifactKind::JobFit => "Failed to analyze job fit with Gemini",
        ArtifactKind::JobMatches => "Failed to fetch job matches",
        ArtifactKind::SkillQuiz => "Failed to generate MCQs",
    }
}

/// The model call itself failed. No raw text exists to keep.
pub fn from_provider_error(kind: ArtifactKind, err: &ProviderError) -> DegradedArtifact {
    let error = match err.kind {
        ProviderErrorKind::EmptyResponse => EMPTY_RESPONSE_MESSAGE,
        _ => failure_message(kind),
    };
    DegradedArtifact {
        error: error.to_string(),
        detail: Some(storable(&err.to_string())),
        raw_text: None,
    }
}

/// The model answered but its text could not be used. Keeps the original
/// (unsanitized) text for diagnostics, NUL characters aside.
pub fn from_parse_error(kind: ArtifactKind, err: &ParseError, raw_text: &str) -> DegradedArtifact {
    let error = match kind {
        ArtifactKind::AtsAnalysis => INVALID_JSON_MESSAGE,
        other => failure_message(other),
    };
    DegradedArtifact {
        error: error.to_string(),
        detail: Some(storable(&err.to_string())),
        raw_text: Some(storable(raw_text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::validator::validate;

    #[test]
    fn test_provider_failure_has_no_raw_text() {
        let err = ProviderError::new(ProviderErrorKind::Network, "connection reset");
        let degraded = from_provider_error(ArtifactKind::JobMatches, &err);
        assert_eq!(degraded.error, "Failed to fetch job matches");
        assert_eq!(degraded.detail.as_deref(), Some("network error: connection reset"));
        assert!(degraded.raw_text.is_none());
    }

    #[test]
    fn test_empty_response_has_fixed_message() {
        let err = ProviderError::empty("no candidates");
        let degraded = from_provider_error(ArtifactKind::SkillQuiz, &err);
        assert_eq!(degraded.error, EMPTY_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_parse_failure_keeps_raw_text() {
        let raw = "Sure! Here's the analysis: {not json";
        let err = validate(ArtifactKind::AtsAnalysis, raw).unwrap_err();
        let degraded = from_parse_error(ArtifactKind::AtsAnalysis, &err, raw);
        assert_eq!(degraded.error, INVALID_JSON_MESSAGE);
        assert_eq!(degraded.raw_text.as_deref(), Some(raw));
        assert!(degraded.detail.unwrap().starts_with("malformed JSON"));
    }

    #[test]
    fn test_job_fit_parse_failure_message() {
        let err = validate(ArtifactKind::JobFit, "[]").unwrap_err();
        let degraded = from_parse_error(ArtifactKind::JobFit, &err, "[]");
        assert_eq!(degraded.error, "Failed to analyze job fit with Gemini");
        assert!(!degraded.error.contains("2.5"));
    }
}
