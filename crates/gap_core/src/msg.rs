#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked (or cleared) the CV document.
    CvSelected(Option<crate::CvFile>),
    /// User edited the job description text.
    JobDescriptionChanged(String),
    /// User asked for an analysis of the current inputs.
    SubmitClicked,
    /// Engine started showing a progress stage for a submission.
    StageStarted {
        submission_id: crate::SubmissionId,
        stage: usize,
        label: String,
    },
    /// Engine finished a submission, successfully or not.
    AnalysisDone {
        submission_id: crate::SubmissionId,
        outcome: Result<crate::AnalysisResult, crate::Failure>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
