//! Schema validation — parses sanitized model text and checks its shape.
//!
//! Syntax failures and wrong top-level containers are hard failures (the
//! orchestrator degrades). Missing keys are not enforced here; the mapper
//! reads them as absent. The one semantic check is MCQ answer membership.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::artifact::ArtifactKind;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    MalformedSyntax(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("question {index}: answer {answer:?} is not one of its options")]
    InvariantViolated { index: usize, answer: String },
}

/// A parsed value in the container shape its kind expects, plus any
/// invariant violations found in it.
#[derive(Debug, Clone)]
pub struct Validated {
    pub value: Value,
    pub violations: Vec<ValidationError>,
}

pub fn validate(kind: ArtifactKind, sanitized: &str) -> Result<Validated, ParseError> {
    let value: Value = serde_json::from_str(sanitized)?;

    let value = match kind {
        ArtifactKind::AtsAnalysis | ArtifactKind::JobFit => expect_object(value)?,
        ArtifactKind::JobMatches => expect_job_list(value)?,
        ArtifactKind::SkillQuiz => expect_quiz(value)?,
    };

    let violations = match kind {
        ArtifactKind::SkillQuiz => check_mcq_answers(&value),
        _ => Vec::new(),
    };

    Ok(Validated { value, violations })
}

fn expect_object(value: Value) -> Result<Value, ParseError> {
    match value {
        Value::Object(_) => Ok(value),
        other => Err(ParseError::UnexpectedShape {
            expected: "a JSON object",
            found: type_name(&other),
        }),
    }
}

/// Job lists arrive as a bare array, or occasionally wrapped as `{"jobs": [...]}`
/// or under some other key next to unrelated arrays.
fn expect_job_list(value: Value) -> Result<Value, ParseError> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(map) => job_array(map).ok_or(ParseError::UnexpectedShape {
            expected: "a JSON array",
            found: "an object without an array field",
        }),
        other => Err(ParseError::UnexpectedShape {
            expected: "a JSON array",
            found: type_name(&other),
        }),
    }
}

/// Quizzes are `{"mcqs": [...]}`; a bare array of items is accepted too.
fn expect_quiz(value: Value) -> Result<Value, ParseError> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert("mcqs".to_string(), Value::Array(items));
            Ok(Value::Object(map))
        }
        other => Err(ParseError::UnexpectedShape {
            expected: "a JSON object with an \"mcqs\" array",
            found: type_name(&other),
        }),
    }
}

/// `jobs` if present, else the first non-empty array, else any array.
/// Keys iterate in sorted order, so an empty `errors` must not win over `results`.
fn job_array(mut map: Map<String, Value>) -> Option<Value> {
    if let Some(jobs) = map.remove("jobs").filter(Value::is_array) {
        return Some(jobs);
    }
    let mut arrays = map.into_iter().map(|(_, v)| v).filter(Value::is_array);
    let first = arrays.next()?;
    if first.as_array().is_some_and(|a| !a.is_empty()) {
        return Some(first);
    }
    Some(
        arrays
            .find(|v| v.as_array().is_some_and(|a| !a.is_empty()))
            .unwrap_or(first),
    )
}

fn check_mcq_answers(quiz: &Value) -> Vec<ValidationError> {
    let Some(items) = quiz.get("mcqs").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let answer = item.get("answer").and_then(Value::as_str).unwrap_or_default();
            let listed = match item.get("options") {
                Some(Value::Array(options)) => options.iter().any(|o| o.as_str() == Some(answer)),
                Some(Value::String(only)) => only == answer,
                _ => false,
            };
            (!listed).then(|| ValidationError::InvariantViolated {
                index,
                answer: answer.to_string(),
            })
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
