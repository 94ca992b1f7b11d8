//! Stage agents — one function per pipeline stage.
//!
//! Shared contract: build a prompt from the stage's template, call the
//! generation backend, recover a JSON object from the raw text, and
//! deserialize it into the stage's typed output. If recovery or
//! deserialization fails, the stage substitutes its deterministic fallback so
//! downstream stages can always address the expected fields. A backend
//! transport error is NOT recovered here — it propagates and fails the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{GenerationBackend, LlmError};
use crate::pipeline::context::{ResumeSubmission, WorkflowContext};
use crate::pipeline::parser::extract_json_object;
use crate::pipeline::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, COMPARISON_PROMPT_TEMPLATE, JOB_MATCH_PROMPT_TEMPLATE,
    JSON_ONLY_PREAMBLE, RECOMMENDATION_PROMPT_TEMPLATE, SCREENING_PROMPT_TEMPLATE,
};

// ────────────────────────────────────────────────────────────────────────────
// Typed stage outputs
// ────────────────────────────────────────────────────────────────────────────

/// Extractor output — a minimal passthrough contract. Resume parsing proper
/// is out of scope; downstream prompts embed `raw_text` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedResume {
    pub raw_text: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub level: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsAnalysis {
    pub technical_skills: Vec<String>,
    pub years_of_experience: f32,
    pub education: Education,
    pub experience_level: String,
    pub key_achievements: Vec<String>,
    pub domain_expertise: Vec<String>,
}

/// Analyzer output: structured profile of the candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skills_analysis: SkillsAnalysis,
    pub confidence_score: f32,
}

/// Screener output: a 0-100 score plus a narrative report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub screening_score: f32,
    pub screening_report: String,
}

impl Default for ScreeningResult {
    fn default() -> Self {
        Self {
            screening_score: 0.0,
            screening_report: "Unable to generate screening report.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchReport {
    pub skills_match_percentage: f32,
    pub experience_relevance: String,
    pub education_alignment: String,
    pub overall_match_score: f32,
}

impl Default for JobMatchReport {
    fn default() -> Self {
        Self {
            skills_match_percentage: 0.0,
            experience_relevance: "Unknown".to_string(),
            education_alignment: "Unknown".to_string(),
            overall_match_score: 0.0,
        }
    }
}

/// JobMatcher output: the match report plus the stage's own completion marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchResult {
    pub match_report: JobMatchReport,
    pub match_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub skills_match: Vec<String>,
    pub experience_match: Vec<String>,
    pub education_match: Vec<String>,
    pub key_differences: Vec<String>,
}

/// Comparison output: the side-by-side report plus completion marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub comparison_report: ComparisonReport,
    pub comparison_status: String,
}

/// Recommender output: the final verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub final_recommendation: String,
    pub recommendation_details: String,
}

impl Default for RecommendationResult {
    fn default() -> Self {
        Self {
            final_recommendation: "No recommendation available".to_string(),
            recommendation_details: "Unable to generate recommendation due to an error."
                .to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage functions
// ────────────────────────────────────────────────────────────────────────────

/// Extraction stage. Pure passthrough — no backend call, cannot fail.
pub fn run_extraction(submission: &ResumeSubmission) -> ExtractedResume {
    info!("Extractor: capturing resume text ({} chars)", submission.resume_text.len());
    ExtractedResume {
        raw_text: submission.resume_text.clone(),
        submitted_at: submission.submitted_at,
    }
}

/// Analysis stage: structured profile from the extracted resume text.
pub async fn run_analysis(
    backend: &dyn GenerationBackend,
    extracted: &ExtractedResume,
) -> Result<AnalysisResult, LlmError> {
    info!("Analyzer: analyzing candidate profile");
    let prompt = format!(
        "{}{}",
        JSON_ONLY_PREAMBLE,
        ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", &extracted.raw_text)
    );
    let raw = backend.generate(&prompt).await?;
    Ok(parse_or_default::<AnalysisResult>("Analyzer", &raw))
}

/// Screening stage: scores the candidate against everything gathered so far.
pub async fn run_screening(
    backend: &dyn GenerationBackend,
    context: &WorkflowContext,
) -> Result<ScreeningResult, LlmError> {
    info!("Screener: screening candidate");
    let prompt = format!(
        "{}{}",
        JSON_ONLY_PREAMBLE,
        SCREENING_PROMPT_TEMPLATE.replace("{workflow_context}", &context.to_prompt_json())
    );
    let raw = backend.generate(&prompt).await?;
    Ok(parse_or_default::<ScreeningResult>("Screener", &raw))
}

/// Job matching stage: aligns the resume against the job description.
pub async fn run_job_matching(
    backend: &dyn GenerationBackend,
    context: &WorkflowContext,
) -> Result<JobMatchResult, LlmError> {
    info!("JobMatcher: matching resume with job description");
    let prompt = format!(
        "{}{}",
        JSON_ONLY_PREAMBLE,
        JOB_MATCH_PROMPT_TEMPLATE
            .replace("{resume_data}", &context.to_prompt_json())
            .replace("{job_description}", &context.resume_data.job_description)
    );
    let raw = backend.generate(&prompt).await?;
    Ok(JobMatchResult {
        match_report: parse_or_default::<JobMatchReport>("JobMatcher", &raw),
        match_status: "completed".to_string(),
    })
}

/// Comparison stage: itemized matches and differences.
pub async fn run_comparison(
    backend: &dyn GenerationBackend,
    context: &WorkflowContext,
) -> Result<ComparisonResult, LlmError> {
    info!("Comparison: comparing resume with job description");
    let prompt = format!(
        "{}{}",
        JSON_ONLY_PREAMBLE,
        COMPARISON_PROMPT_TEMPLATE
            .replace("{resume_data}", &context.to_prompt_json())
            .replace("{job_description}", &context.resume_data.job_description)
    );
    let raw = backend.generate(&prompt).await?;
    Ok(ComparisonResult {
        comparison_report: parse_or_default::<ComparisonReport>("Comparison", &raw),
        comparison_status: "completed".to_string(),
    })
}

/// Recommendation stage: final verdict over the whole workflow context.
pub async fn run_recommendation(
    backend: &dyn GenerationBackend,
    context: &WorkflowContext,
) -> Result<RecommendationResult, LlmError> {
    info!("Recommender: generating final recommendation");
    let prompt = format!(
        "{}{}",
        JSON_ONLY_PREAMBLE,
        RECOMMENDATION_PROMPT_TEMPLATE.replace("{workflow_context}", &context.to_prompt_json())
    );
    let raw = backend.generate(&prompt).await?;
    Ok(parse_or_default::<RecommendationResult>("Recommender", &raw))
}

/// Recovers a JSON object from raw model text and deserializes it into the
/// stage's schema. Any content-level failure (no JSON, wrong shape, missing
/// keys) yields the schema default — never an error.
fn parse_or_default<T>(stage_name: &str, raw: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match extract_json_object(raw) {
        Ok(value) => serde_json::from_value::<T>(value).unwrap_or_else(|e| {
            warn!("{stage_name}: model output did not match schema ({e}), using defaults");
            T::default()
        }),
        Err(e) => {
            warn!("{stage_name}: no JSON object in model output ({e}), using defaults");
            T::default()
        }
    }
}
