// All LLM prompt templates for the generation module.
// Placeholders: {format_rules}, {job_description}, {resume_text}.

use crate::llm_client::prompts::{JSON_ARRAY_RULES, JSON_OBJECT_RULES, NO_JOB_DESCRIPTION};
use crate::models::artifact::ArtifactKind;

pub const ATS_ANALYSIS_TEMPLATE: &str = r#"You are an ATS resume analyzer.

{format_rules}

Job Description:
{job_description}

Candidate Resume:
{resume_text}

Return JSON with the following keys:
- candidate_name: Full name of the candidate.
- job_title: Current or target professional title (e.g., Frontend Developer).
- contact_info:
    - email: Candidate's email address.
    - location: Candidate's city and country/state (e.g., Bengaluru, IN).
- professional_summary: A 2-3 sentence overview of their experience and key stack.
- ats_compatibility_score: Integer between 0 and 100.
- strengths: Array of 3 key professional highlights.
- weaknesses: Array of 3 areas for improvement.
- improvement_suggestions: Array of actionable resume tips."#;

pub const JOB_FIT_TEMPLATE: &str = r#"You are an expert HR Data Scientist and ATS Optimizer.

{format_rules}

Job Description:
{job_description}

Candidate Resume:
{resume_text}

Return JSON with exactly these keys:
- candidate_name: Full name of the candidate.
- job_title: Current or target professional title.
- contact_info:
    - email: Candidate's email address.
    - location: Candidate's city and country/state.
- job_fit_score: Integer (0-100) representing match percentage.
- strengths: Array of strings (exactly 3) highlighting professional assets relevant to this JD.
- gap_summary: Concise 2-sentence explanation of overall alignment and key missing areas.
- matched_skills: Array of strings representing skills found in both.
- missing_skills: Array of strings representing required skills not found in the resume.
- recommendations: Array of actionable steps to improve fit for THIS role."#;

pub const JOB_MATCHES_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System). Analyze the following resume text and find 6 real-world current job openings that match the candidate's skills.

RESUME TEXT:
{resume_text}

TARGET ROLE (optional context):
{job_description}

{format_rules}
- 'package' must be in Lakhs (INR), e.g., "₹18L - ₹25L".
- 'match_score' must be an integer (0-100).
- Provide 6 distinct job objects.

JSON STRUCTURE:
[
  {
    "company": "Company Name",
    "job_title": "Title",
    "location": "City, State",
    "package": "₹24L - ₹32L",
    "skills_required": ["Skill 1", "Skill 2", "Skill 3", "Skill 4"],
    "match_score": 94,
    "apply_link": "URL"
  }
]"#;

pub const SKILL_QUIZ_TEMPLATE: &str = r#"You are a Senior Technical Interviewer. Your task is to validate a candidate's technical expertise through a skill-based assessment.

STRICT GUIDELINES:
1. Do NOT ask questions about the candidate's personal history, internship locations, or specific company names.
2. Identify core technical skills from the resume (e.g., IoT, Python, C Programming, Embedded Systems, Electronics).
3. Generate 10 high-quality, conceptual, or practical MCQs testing deep understanding of those skills.
4. Ensure questions range from basic to intermediate difficulty.
5. Every question has exactly 4 options.
6. The "answer" must be the exact text of the correct option from the "options" list.

{format_rules}

Target Role (optional context):
{job_description}

Candidate Resume Text:
{resume_text}

Return ONLY a JSON object with this structure:
{
    "mcqs": [
        {
            "question": "A technical question",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "answer": "Option B"
        }
    ]
}"#;

/// Builds the full instruction string for one artifact kind.
///
/// A missing or blank job description is replaced by an explicit placeholder,
/// so the model always receives a complete prompt.
pub fn build_prompt(kind: ArtifactKind, resume_text: &str, job_description: Option<&str>) -> String {
    let (template, format_rules) = match kind {
        ArtifactKind::AtsAnalysis => (ATS_ANALYSIS_TEMPLATE, JSON_OBJECT_RULES),
        ArtifactKind::JobFit => (JOB_FIT_TEMPLATE, JSON_OBJECT_RULES),
        ArtifactKind::JobMatches => (JOB_MATCHES_TEMPLATE, JSON_ARRAY_RULES),
        ArtifactKind::SkillQuiz => (SKILL_QUIZ_TEMPLATE, JSON_OBJECT_RULES),
    };

    let job_description = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .unwrap_or(NO_JOB_DESCRIPTION);

    template
        .replace("{format_rules}", format_rules)
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
