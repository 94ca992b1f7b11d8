// All LLM prompt constants for the screening pipeline.
// Each template declares its JSON schema inline and forbids prose — the model
// ignores that often enough that parser::extract_json_object exists.

/// Shared preamble prepended to every stage prompt — enforces JSON-only output.
pub const JSON_ONLY_PREAMBLE: &str = "You are a recruitment analysis assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.\n\n";

/// Analyzer prompt. Replace `{resume_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following candidate profile and return a JSON object with this EXACT structure:
{
    "skills_analysis": {
        "technical_skills": ["skill1", "skill2"],
        "years_of_experience": 5,
        "education": {
            "level": "Bachelors",
            "field": "Computer Science"
        },
        "experience_level": "Senior",
        "key_achievements": ["achievement1", "achievement2"],
        "domain_expertise": ["domain1", "domain2"]
    },
    "confidence_score": 0.85
}

Candidate profile:
{resume_text}

Return ONLY the JSON object, no other text."#;

/// Screener prompt. Replace `{workflow_context}` before sending.
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"Screen the candidate described in the following workflow context and return a JSON object with this EXACT structure:
{
    "screening_score": 75,
    "screening_report": "string"
}

The screening_score is 0-100. The screening_report summarizes strengths, weaknesses, and red flags.

Workflow context:
{workflow_context}

Return ONLY the JSON object, no other text."#;

/// JobMatcher prompt. Replace `{resume_data}` and `{job_description}` before sending.
pub const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"Match the following resume data with the job description and return a JSON object with the following structure:
{
    "skills_match_percentage": 80,
    "experience_relevance": "string",
    "education_alignment": "string",
    "overall_match_score": 85
}

Resume data:
{resume_data}

Job description:
{job_description}

Return ONLY the JSON object, no other text."#;

/// Comparison prompt. Replace `{resume_data}` and `{job_description}` before sending.
pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"Compare the following resume data with the job description and return a JSON object with the following structure:
{
    "skills_match": ["skill1", "skill2"],
    "experience_match": ["experience1", "experience2"],
    "education_match": ["education1", "education2"],
    "key_differences": ["difference1", "difference2"]
}

Resume data:
{resume_data}

Job description:
{job_description}

Return ONLY the JSON object, no other text."#;

/// Recommender prompt. Replace `{workflow_context}` before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Based on the following workflow context, generate a final recommendation and return a JSON object with the following structure:
{
    "final_recommendation": "string",
    "recommendation_details": "string"
}

Workflow context:
{workflow_context}

Return ONLY the JSON object, no other text."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_their_placeholders() {
        assert!(ANALYSIS_PROMPT_TEMPLATE.contains("{resume_text}"));
        assert!(SCREENING_PROMPT_TEMPLATE.contains("{workflow_context}"));
        assert!(JOB_MATCH_PROMPT_TEMPLATE.contains("{resume_data}"));
        assert!(JOB_MATCH_PROMPT_TEMPLATE.contains("{job_description}"));
        assert!(COMPARISON_PROMPT_TEMPLATE.contains("{resume_data}"));
        assert!(RECOMMENDATION_PROMPT_TEMPLATE.contains("{workflow_context}"));
    }
}
