//! Flat-file persistence of completed screening reports.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::pipeline::context::WorkflowContext;

/// Writes the full workflow context to `<results_dir>/analysis_<timestamp>.txt`
/// and returns the path written.
pub async fn save_report(results_dir: &Path, context: &WorkflowContext) -> Result<PathBuf> {
    let filename = format!("analysis_{}.txt", Utc::now().format("%Y%m%d_%H%M%S"));
    let path = results_dir.join(filename);

    let body = serde_json::to_string_pretty(context).context("Failed to serialize report")?;

    tokio::fs::create_dir_all(results_dir)
        .await
        .with_context(|| format!("Failed to create results dir {}", results_dir.display()))?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::{ResumeSubmission, WorkflowContext};

    #[tokio::test]
    async fn test_report_is_written_as_parsable_json() {
        let dir = tempfile::tempdir().unwrap();
        let context = WorkflowContext::new(ResumeSubmission {
            resume_text: "text".to_string(),
            job_description: "jd".to_string(),
            submitted_at: Utc::now(),
        });

        let path = save_report(dir.path(), &context).await.unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("analysis_"));
        assert!(name.ends_with(".txt"));

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "initiated");
    }
}
