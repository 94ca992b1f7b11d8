//! Workflow context — the append-only record threaded through a screening run.
//!
//! Only the orchestrator writes to `WorkflowContext`; stages receive it (or a
//! slice of it) immutably and hand back new typed outputs. A populated result
//! field is never overwritten.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::stages::{
    AnalysisResult, ComparisonResult, ExtractedResume, JobMatchResult, RecommendationResult,
    ScreeningResult,
};

/// The raw application material a run starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSubmission {
    pub resume_text: String,
    pub job_description: String,
    pub submitted_at: DateTime<Utc>,
}

/// Terminal status of a run. Transitions only initiated → completed or
/// initiated → failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initiated,
    Completed,
    Failed,
}

/// The fixed stage sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Analysis,
    Screening,
    JobMatching,
    Comparison,
    Recommendation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extraction => "extraction",
            Stage::Analysis => "analysis",
            Stage::Screening => "screening",
            Stage::JobMatching => "job_matching",
            Stage::Comparison => "comparison",
            Stage::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated results of one screening run. Grows monotonically; absent
/// stages serialize as absent keys so a completed run carries exactly one key
/// per stage executed.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowContext {
    pub resume_data: ResumeSubmission,
    pub status: WorkflowStatus,
    pub current_stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedResume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_results: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening_results: Option<ScreeningResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_match: Option<JobMatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_recommendation: Option<RecommendationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowContext {
    pub fn new(resume_data: ResumeSubmission) -> Self {
        Self {
            resume_data,
            status: WorkflowStatus::Initiated,
            current_stage: Stage::Extraction,
            extracted_data: None,
            analysis_results: None,
            screening_results: None,
            job_match: None,
            comparison: None,
            final_recommendation: None,
            error: None,
        }
    }

    /// JSON rendering of the accumulated context, embedded into downstream
    /// prompts. Serialization of these types cannot realistically fail; the
    /// fallback keeps the prompt well-formed regardless.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ResumeSubmission {
        ResumeSubmission {
            resume_text: "Jane Doe. Rust engineer, 6 years.".to_string(),
            job_description: "Senior Rust Engineer".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_context_is_initiated_at_extraction() {
        let context = WorkflowContext::new(submission());
        assert_eq!(context.status, WorkflowStatus::Initiated);
        assert_eq!(context.current_stage, Stage::Extraction);
        assert!(context.error.is_none());
    }

    #[test]
    fn test_stage_names_are_snake_case() {
        assert_eq!(Stage::JobMatching.as_str(), "job_matching");
        assert_eq!(Stage::Recommendation.to_string(), "recommendation");

        let json = serde_json::to_string(&Stage::JobMatching).unwrap();
        assert_eq!(json, r#""job_matching""#);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&WorkflowStatus::Completed).unwrap();
        assert_eq!(json, r#""completed""#);
        let status: WorkflowStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(status, WorkflowStatus::Failed);
    }

    #[test]
    fn test_absent_stage_results_serialize_as_absent_keys() {
        let context = WorkflowContext::new(submission());
        let value = serde_json::to_value(&context).unwrap();
        let object = value.as_object().unwrap();

        assert!(object.contains_key("resume_data"));
        assert_eq!(object["status"], "initiated");
        assert!(!object.contains_key("job_match"));
        assert!(!object.contains_key("comparison"));
        assert!(!object.contains_key("final_recommendation"));
        assert!(!object.contains_key("error"));
    }

    #[test]
    fn test_prompt_json_is_valid_json() {
        let context = WorkflowContext::new(submission());
        let rendered = context.to_prompt_json();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed.is_object());
    }
}
