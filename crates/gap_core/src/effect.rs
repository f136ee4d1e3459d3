use std::path::PathBuf;

use crate::SubmissionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Play the progress stages and dispatch the analysis request.
    StartAnalysis {
        submission_id: SubmissionId,
        cv_path: PathBuf,
        job_description: String,
    },
    /// Abandon an in-flight submission that has been superseded.
    CancelAnalysis { submission_id: SubmissionId },
}
