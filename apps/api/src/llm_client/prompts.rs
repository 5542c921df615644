// Shared prompt fragments. Each artifact template in generation::prompts
// embeds these so every kind carries the same output-format contract.

/// Output-format rules for templates whose response is a JSON object.
pub const JSON_OBJECT_RULES: &str = "\
STRICT RULES:
- Respond ONLY in valid JSON.
- Do NOT use markdown code blocks.
- Do NOT wrap the response in ```json.
- Do NOT add any text or explanations outside the JSON object.";

/// Output-format rules for templates whose response is a JSON array.
pub const JSON_ARRAY_RULES: &str = "\
STRICT RULES:
- Return ONLY a JSON array.
- Do NOT use markdown code blocks.
- Do NOT add text outside JSON.";

/// Substituted when the caller did not send a job description.
pub const NO_JOB_DESCRIPTION: &str = "No job description provided.";
