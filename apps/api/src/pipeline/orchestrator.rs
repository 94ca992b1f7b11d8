//! Orchestrator — drives the fixed stage sequence over one screening run.
//!
//! Stages execute strictly sequentially; each one is awaited before the next
//! starts. The orchestrator alone merges stage outputs into the append-only
//! `WorkflowContext`. Content-level recovery lives inside the stages; any
//! error that reaches this level marks the run failed and is returned to the
//! caller with the failed context attached.

use thiserror::Error;
use tracing::{error, info};

use crate::llm_client::GenerationBackend;
use crate::pipeline::context::{ResumeSubmission, Stage, WorkflowContext, WorkflowStatus};
use crate::pipeline::stages::{
    run_analysis, run_comparison, run_extraction, run_job_matching, run_recommendation,
    run_screening,
};

/// A run that stopped partway. Carries the stage that failed and the context
/// as it stood at the moment of failure (`status == Failed`, `error` set).
#[derive(Debug, Error)]
#[error("pipeline failed at stage {stage}: {message}")]
pub struct PipelineError {
    pub stage: Stage,
    pub message: String,
    pub context: Box<WorkflowContext>,
}

/// Runs the full screening pipeline:
/// extraction → analysis → screening → job_matching → comparison → recommendation.
///
/// On success the returned context has `status == Completed` and one result
/// per stage. On failure the error carries the partial context; no resume or
/// retry is attempted.
pub async fn run_pipeline(
    backend: &dyn GenerationBackend,
    submission: ResumeSubmission,
) -> Result<WorkflowContext, PipelineError> {
    info!("Orchestrator: starting application process");
    let mut context = WorkflowContext::new(submission);

    // Extraction (pure passthrough, cannot fail)
    let extracted = run_extraction(&context.resume_data);
    context.extracted_data = Some(extracted.clone());
    context.current_stage = Stage::Analysis;

    // Analysis
    let analysis = match run_analysis(backend, &extracted).await {
        Ok(result) => result,
        Err(e) => return Err(fail(context, e)),
    };
    context.analysis_results = Some(analysis);
    context.current_stage = Stage::Screening;

    // Screening
    let screening = match run_screening(backend, &context).await {
        Ok(result) => result,
        Err(e) => return Err(fail(context, e)),
    };
    context.screening_results = Some(screening);
    context.current_stage = Stage::JobMatching;

    // Job matching
    let job_match = match run_job_matching(backend, &context).await {
        Ok(result) => result,
        Err(e) => return Err(fail(context, e)),
    };
    context.job_match = Some(job_match);
    context.current_stage = Stage::Comparison;

    // Comparison
    let comparison = match run_comparison(backend, &context).await {
        Ok(result) => result,
        Err(e) => return Err(fail(context, e)),
    };
    context.comparison = Some(comparison);
    context.current_stage = Stage::Recommendation;

    // Recommendation
    let recommendation = match run_recommendation(backend, &context).await {
        Ok(result) => result,
        Err(e) => return Err(fail(context, e)),
    };
    context.final_recommendation = Some(recommendation);
    context.status = WorkflowStatus::Completed;

    info!("Orchestrator: application process completed");
    Ok(context)
}

/// Marks the run failed at its current stage and wraps it into the error
/// returned to the caller.
fn fail(mut context: WorkflowContext, source: impl std::fmt::Display) -> PipelineError {
    let stage = context.current_stage;
    let message = source.to_string();
    error!("Orchestrator: stage {stage} failed: {message}");

    context.status = WorkflowStatus::Failed;
    context.error = Some(message.clone());

    PipelineError {
        stage,
        message,
        context: Box::new(context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedBackend;
    use chrono::Utc;

    fn submission() -> ResumeSubmission {
        ResumeSubmission {
            resume_text: "Jane Doe. Rust engineer, 6 years, BS in CS.".to_string(),
            job_description: "Senior Rust Engineer, distributed systems.".to_string(),
            submitted_at: Utc::now(),
        }
    }

    const ANALYSIS_JSON: &str = r#"{
        "skills_analysis": {
            "technical_skills": ["Rust"],
            "years_of_experience": 6,
            "education": {"level": "Bachelors", "field": "CS"},
            "experience_level": "Senior",
            "key_achievements": ["Shipped platform"],
            "domain_expertise": ["fintech"]
        },
        "confidence_score": 0.9
    }"#;
    const SCREENING_JSON: &str =
        r#"{"screening_score": 78, "screening_report": "Strong candidate."}"#;
    const JOB_MATCH_JSON: &str = r#"{"skills_match_percentage": 80, "experience_relevance": "High", "education_alignment": "Match", "overall_match_score": 85}"#;
    const COMPARISON_JSON: &str = r#"{"skills_match": ["Rust"], "experience_match": ["6 years"], "education_match": ["BS CS"], "key_differences": ["No k8s"]}"#;
    const RECOMMENDATION_JSON: &str =
        r#"{"final_recommendation": "Hire", "recommendation_details": "Meets the bar."}"#;

    #[tokio::test]
    async fn test_happy_path_visits_every_stage_in_order() {
        let backend = ScriptedBackend::replies(vec![
            ANALYSIS_JSON,
            SCREENING_JSON,
            JOB_MATCH_JSON,
            COMPARISON_JSON,
            RECOMMENDATION_JSON,
        ]);

        let context = run_pipeline(&backend, submission()).await.unwrap();

        assert_eq!(context.status, WorkflowStatus::Completed);
        assert_eq!(context.current_stage, Stage::Recommendation);
        assert!(context.error.is_none());

        // One populated result per stage executed
        assert!(context.extracted_data.is_some());
        assert!(context.analysis_results.is_some());
        assert!(context.screening_results.is_some());
        assert!(context.job_match.is_some());
        assert!(context.comparison.is_some());
        assert!(context.final_recommendation.is_some());

        let screening = context.screening_results.unwrap();
        assert!((screening.screening_score - 78.0).abs() < f32::EPSILON);
        let recommendation = context.final_recommendation.unwrap();
        assert_eq!(recommendation.final_recommendation, "Hire");
    }

    #[tokio::test]
    async fn test_backend_fault_at_screening_fails_the_run_there() {
        let backend = ScriptedBackend::new(vec![
            Ok(ANALYSIS_JSON),
            Err("connection refused"),
        ]);

        let err = run_pipeline(&backend, submission()).await.unwrap_err();

        assert_eq!(err.stage, Stage::Screening);
        let context = *err.context;
        assert_eq!(context.status, WorkflowStatus::Failed);
        assert_eq!(context.current_stage, Stage::Screening);
        assert!(context.error.as_deref().unwrap().contains("connection refused"));

        // Nothing downstream of the fault is present
        assert!(context.analysis_results.is_some());
        assert!(context.screening_results.is_none());
        assert!(context.job_match.is_none());
        assert!(context.comparison.is_none());
        assert!(context.final_recommendation.is_none());
    }

    #[tokio::test]
    async fn test_backend_fault_at_first_llm_stage() {
        let backend = ScriptedBackend::new(vec![Err::<&str, &str>("model not found")]);

        let err = run_pipeline(&backend, submission()).await.unwrap_err();

        assert_eq!(err.stage, Stage::Analysis);
        assert_eq!(err.context.status, WorkflowStatus::Failed);
        // Extraction is a passthrough, so its output is present even here
        assert!(err.context.extracted_data.is_some());
    }

    #[tokio::test]
    async fn test_unparsable_content_degrades_but_completes() {
        // Every stage replies with prose only: the run still completes with
        // each stage's fallback default in place.
        let backend = ScriptedBackend::replies(vec![
            "no json",
            "still no json",
            "nope",
            "nothing",
            "sorry",
        ]);

        let context = run_pipeline(&backend, submission()).await.unwrap();

        assert_eq!(context.status, WorkflowStatus::Completed);
        let job_match = context.job_match.unwrap();
        assert_eq!(job_match.match_report.experience_relevance, "Unknown");
        let recommendation = context.final_recommendation.unwrap();
        assert_eq!(recommendation.final_recommendation, "No recommendation available");
    }

    #[tokio::test]
    async fn test_completed_context_serializes_one_key_per_stage() {
        let backend = ScriptedBackend::replies(vec![
            ANALYSIS_JSON,
            SCREENING_JSON,
            JOB_MATCH_JSON,
            COMPARISON_JSON,
            RECOMMENDATION_JSON,
        ]);

        let context = run_pipeline(&backend, submission()).await.unwrap();
        let value = serde_json::to_value(&context).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "extracted_data",
            "analysis_results",
            "screening_results",
            "job_match",
            "comparison",
            "final_recommendation",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object["status"], "completed");
        assert_eq!(object["current_stage"], "recommendation");
        assert!(!object.contains_key("error"));
    }
}
