// Artifact generation: prompt → model → sanitize → validate → map | degrade → persist.
// All model calls go through llm_client::CompletionProvider.

use serde::{de::DeserializeOwned, Serialize};

use crate::generation::validator::Validated;
use crate::llm_client::ResponseFormat;
use crate::models::artifact::ArtifactKind;

pub mod fallback;
pub mod handlers;
pub mod mapper;
pub mod orchestrator;
pub mod prompts;
pub mod validator;

/// Postgres TEXT and JSONB reject U+0000. Every model- or caller-supplied
/// string that gets persisted passes through here.
pub(crate) fn storable(text: &str) -> String {
    text.replace('\0', "\u{FFFD}")
}

/// A typed artifact the orchestrator can generate. Implemented in `mapper`.
pub trait GeneratedArtifact:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const KIND: ArtifactKind;
    /// Output-format hint sent with the prompt.
    const RESPONSE_FORMAT: Option<ResponseFormat>;

    fn from_validated(validated: &Validated) -> Self;
}
