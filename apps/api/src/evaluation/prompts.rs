// All LLM prompt constants for the Evaluation module.
// Placeholders are filled with `llm_client::prompts::render`.

/// System prompt for interview question generation.
pub const QUESTIONS_SYSTEM: &str = "You are a technology recruiting expert with 10+ years of experience. \
    Your job is to write sharp screening questions that evaluate candidates effectively. \
    Questions must be specific to the role and its technologies, cover both technical and \
    soft skills, be clear and direct, and let the candidate demonstrate real experience.";

/// Question generation prompt. Replace: {title}, {description}, {skills}, {min_experience}, {json_only}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Write 5-7 screening questions for this job posting:

Title: {title}
Description: {description}
Required skills: {skills}
Minimum experience: {min_experience} years

Return a JSON ARRAY with this EXACT schema (no extra fields):
[
  {"question": "question text here", "kind": "open"},
  {"question": "question text here", "kind": "yes_no"}
]

Valid values for "kind": "open", "yes_no", "scale".

{json_only}"#;

/// System prompt for résumé analysis.
pub const RESUME_SYSTEM: &str = "You are an expert at analyzing résumés and professional profiles. \
    Extract key information precisely and in a structured form.";

/// Résumé analysis prompt. Replace: {resume_text}, {json_only}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Analyze this résumé and extract its key facts.

RÉSUMÉ:
{resume_text}

Return a JSON object with this EXACT schema:
{
  "skills": ["Python", "React"],
  "years_experience": 4,
  "education": "B.Sc. Systems Engineering",
  "summary": "Short professional summary in 2-3 lines"
}

If a field cannot be found, use null or [] as appropriate.

{json_only}"#;

/// System prompt for compatibility scoring.
pub const COMPATIBILITY_SYSTEM: &str = "You are an expert at evaluating candidates for technology roles. \
    Your analysis must be objective, fair, and grounded in concrete evidence.";

/// Compatibility prompt.
/// Replace: {title}, {skills}, {min_experience}, {resume_text}, {answers}, {json_only}
pub const COMPATIBILITY_PROMPT_TEMPLATE: &str = r#"Evaluate how well this candidate fits the job posting.

JOB POSTING:
- Title: {title}
- Required skills: {skills}
- Minimum experience: {min_experience} years

CANDIDATE:
Résumé: {resume_text}

ANSWERS TO SCREENING QUESTIONS:
{answers}

Return a JSON object with this EXACT schema:
{
  "score": 85,
  "compatibility": 78,
  "strengths": ["Solid React experience", "Clear communication"],
  "weaknesses": ["Little exposure to microservices"]
}

- score: 0-100, overall assessment of the candidate
- compatibility: 0-100, how well they fit this specific posting
- strengths: 2-4 strong points
- weaknesses: 1-3 areas to improve

Be honest but constructive.

{json_only}"#;
