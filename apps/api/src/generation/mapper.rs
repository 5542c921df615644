//! Artifact mapping — validated JSON values into canonical artifact records.
//!
//! This is the only place defaults are applied. Every accessor is total:
//! absent, null or wrongly-typed fields become `None` / empty / 0.
//! Scores are clamped into 0..=100 (non-integers rounded, numeric strings parsed).

use serde_json::Value;
use tracing::warn;

use crate::generation::validator::{Validated, ValidationError};
use crate::generation::{storable, GeneratedArtifact};
use crate::llm_client::ResponseFormat;
use crate::models::artifact::{
    ArtifactKind, AtsAnalysis, ContactInfo, JobFitAnalysis, JobMatches, JobRecommendation,
    McqItem, McqSet, McqViolation,
};

const EXPECTED_STRENGTHS: usize = 3;
const EXPECTED_WEAKNESSES: usize = 3;
const EXPECTED_JOBS: usize = 6;
const EXPECTED_MCQS: usize = 10;
const EXPECTED_OPTIONS: usize = 4;

impl GeneratedArtifact for AtsAnalysis {
    const KIND: ArtifactKind = ArtifactKind::AtsAnalysis;
    const RESPONSE_FORMAT: Option<ResponseFormat> = None;

    fn from_validated(validated: &Validated) -> Self {
        let v = &validated.value;
        let analysis = AtsAnalysis {
            candidate_name: text(v, "candidate_name"),
            job_title: text(v, "job_title"),
            contact_info: contact_info(v),
            professional_summary: text(v, "professional_summary"),
            ats_compatibility_score: score(v, "ats_compatibility_score"),
            strengths: string_list(v, "strengths"),
            weaknesses: string_list(v, "weaknesses"),
            improvement_suggestions: string_list(v, "improvement_suggestions"),
        };
        expect_len(Self::KIND, "strengths", analysis.strengths.len(), EXPECTED_STRENGTHS);
        expect_len(Self::KIND, "weaknesses", analysis.weaknesses.len(), EXPECTED_WEAKNESSES);
        analysis
    }
}

impl GeneratedArtifact for JobFitAnalysis {
    const KIND: ArtifactKind = ArtifactKind::JobFit;
    const RESPONSE_FORMAT: Option<ResponseFormat> = None;

    fn from_validated(validated: &Validated) -> Self {
        let v = &validated.value;
        let analysis = JobFitAnalysis {
            candidate_name: text(v, "candidate_name"),
            job_title: text(v, "job_title"),
            contact_info: contact_info(v),
            job_fit_score: score(v, "job_fit_score"),
            strengths: string_list(v, "strengths"),
            gap_summary: text(v, "gap_summary"),
            matched_skills: string_list(v, "matched_skills"),
            missing_skills: string_list(v, "missing_skills"),
            recommendations: string_list(v, "recommendations"),
        };
        expect_len(Self::KIND, "strengths", analysis.strengths.len(), EXPECTED_STRENGTHS);
        analysis
    }
}

impl GeneratedArtifact for JobMatches {
    const KIND: ArtifactKind = ArtifactKind::JobMatches;
    const RESPONSE_FORMAT: Option<ResponseFormat> = Some(ResponseFormat::Json);

    fn from_validated(validated: &Validated) -> Self {
        let jobs: Vec<JobRecommendation> = validated
            .value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(job_recommendation)
                    .collect()
            })
            .unwrap_or_default();
        expect_len(Self::KIND, "jobs", jobs.len(), EXPECTED_JOBS);
        JobMatches { jobs }
    }
}

impl GeneratedArtifact for McqSet {
    const KIND: ArtifactKind = ArtifactKind::SkillQuiz;
    const RESPONSE_FORMAT: Option<ResponseFormat> = Some(ResponseFormat::Json);

    fn from_validated(validated: &Validated) -> Self {
        let mcqs: Vec<McqItem> = validated
            .value
            .get("mcqs")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(mcq_item).collect())
            .unwrap_or_default();
        expect_len(Self::KIND, "mcqs", mcqs.len(), EXPECTED_MCQS);
        for (index, item) in mcqs.iter().enumerate() {
            if item.options.len() != EXPECTED_OPTIONS {
                warn!(
                    "{}: question {} has {} options (expected {})",
                    Self::KIND,
                    index,
                    item.options.len(),
                    EXPECTED_OPTIONS
                );
            }
        }

        let violations = validated
            .violations
            .iter()
            .map(|ValidationError::InvariantViolated { index, answer }| McqViolation {
                index: *index,
                answer: answer.clone(),
            })
            .collect();

        McqSet { mcqs, violations }
    }
}

fn job_recommendation(v: &Value) -> JobRecommendation {
    JobRecommendation {
        company: text(v, "company"),
        job_title: text(v, "job_title"),
        location: text(v, "location"),
        package: text(v, "package"),
        skills_required: string_list(v, "skills_required"),
        match_score: score(v, "match_score"),
        apply_link: text(v, "apply_link"),
    }
}

fn mcq_item(v: &Value) -> McqItem {
    McqItem {
        question: text(v, "question").unwrap_or_default(),
        options: string_list(v, "options"),
        answer: text(v, "answer").unwrap_or_default(),
    }
}

fn contact_info(v: &Value) -> ContactInfo {
    let contact = v.get("contact_info").unwrap_or(&Value::Null);
    ContactInfo {
        email: text(contact, "email"),
        location: text(contact, "location"),
    }
}

fn text(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(storable)
}

/// Arrays keep their string elements; a lone string becomes a one-element list.
fn string_list(v: &Value, key: &str) -> Vec<String> {
    match v.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(storable)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![storable(s)],
        _ => Vec::new(),
    }
}

fn score(v: &Value, key: &str) -> u8 {
    let raw = match v.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(raw) = raw.filter(|r| r.is_finite()) else {
        return 0;
    };
    let clamped = raw.round().clamp(0.0, 100.0);
    if clamped != raw {
        warn!("{key}={raw} coerced to {clamped}");
    }
    clamped as u8
}

fn expect_len(kind: ArtifactKind, field: &str, actual: usize, expected: usize) {
    if actual != expected {
        warn!("{kind}: {field} has {actual} entries (expected {expected})");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::generation::validator::validate;

    fn validated(value: Value) -> Validated {
        Validated {
            value,
            violations: Vec::new(),
        }
    }

    #[test]
    fn test_ats_analysis_maps_all_fields() {
        let v = validated(json!({
            "candidate_name": "Asha Rao",
            "job_title": "Backend Engineer",
            "contact_info": {"email": "asha@example.com", "location": "Bengaluru, IN"},
            "professional_summary": "Five years building Python services.",
            "ats_compatibility_score": 82,
            "strengths": ["Python", "PostgreSQL", "AWS"],
            "weaknesses": ["No metrics", "Long summary", "Sparse skills section"],
            "improvement_suggestions": ["Quantify impact"]
        }));
        let analysis = AtsAnalysis::from_validated(&v);
        assert_eq!(analysis.candidate_name.as_deref(), Some("Asha Rao"));
        assert_eq!(analysis.contact_info.email.as_deref(), Some("asha@example.com"));
        assert_eq!(analysis.ats_compatibility_score, 82);
        assert_eq!(analysis.strengths, vec!["Python", "PostgreSQL", "AWS"]);
        assert_eq!(analysis.weaknesses.len(), 3);
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let high = AtsAnalysis::from_validated(&validated(json!({"ats_compatibility_score": 142})));
        assert_eq!(high.ats_compatibility_score, 100);

        let low = JobFitAnalysis::from_validated(&validated(json!({"job_fit_score": -7})));
        assert_eq!(low.job_fit_score, 0);
    }

    #[test]
    fn test_non_integer_scores_are_coerced() {
        assert_eq!(score(&json!({"s": 72.6}), "s"), 73);
        assert_eq!(score(&json!({"s": "88"}), "s"), 88);
        assert_eq!(score(&json!({"s": "91%"}), "s"), 91);
        assert_eq!(score(&json!({"s": "high"}), "s"), 0);
        assert_eq!(score(&json!({"s": null}), "s"), 0);
        assert_eq!(score(&json!({}), "s"), 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let analysis = JobFitAnalysis::from_validated(&validated(json!({})));
        assert_eq!(analysis, JobFitAnalysis::default());
    }

    #[test]
    fn test_wrongly_typed_fields_default() {
        let analysis = AtsAnalysis::from_validated(&validated(json!({
            "candidate_name": 42,
            "contact_info": "asha@example.com",
            "strengths": [1, "Rust", null],
            "weaknesses": "Only one weakness"
        })));
        assert_eq!(analysis.candidate_name, None);
        assert_eq!(analysis.contact_info, ContactInfo::default());
        assert_eq!(analysis.strengths, vec!["Rust"]);
        assert_eq!(analysis.weaknesses, vec!["Only one weakness"]);
    }

    #[test]
    fn test_job_matches_keep_order_and_skip_non_objects() {
        let matches = JobMatches::from_validated(&validated(json!([
            {"company": "Acme", "match_score": 94, "package": "₹24L - ₹32L"},
            "garbage",
            {"company": "Globex", "match_score": 250}
        ])));
        assert_eq!(matches.jobs.len(), 2);
        assert_eq!(matches.jobs[0].company.as_deref(), Some("Acme"));
        assert_eq!(matches.jobs[0].package.as_deref(), Some("₹24L - ₹32L"));
        assert_eq!(matches.jobs[1].match_score, 100);
    }

    #[test]
    fn test_mcq_set_keeps_violating_items() {
        let text = r#"{"mcqs": [
            {"question": "q1", "options": ["A", "B", "C", "D"], "answer": "A"},
            {"question": "q2", "options": ["A", "B", "C", "D"], "answer": "Option E"}
        ]}"#;
        let set = McqSet::from_validated(&validate(ArtifactKind::SkillQuiz, text).unwrap());
        assert_eq!(set.mcqs.len(), 2);
        assert_eq!(
            set.violations,
            vec![McqViolation {
                index: 1,
                answer: "Option E".to_string()
            }]
        );
        for (index, item) in set.mcqs.iter().enumerate() {
            assert!(item.answer_is_an_option() || set.violations.iter().any(|v| v.index == index));
        }
    }
}
