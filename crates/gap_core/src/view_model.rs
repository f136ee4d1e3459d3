use crate::AnalysisResult;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub cv_name: Option<String>,
    pub job_description_chars: usize,
    pub busy: bool,
    pub result: ResultView,
    pub dirty: bool,
}

/// Presentation form of `ResultState`; failures carry only the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultView {
    #[default]
    Idle,
    Loading {
        label: String,
        /// 1-based position of the visible stage.
        position: usize,
        stage_count: usize,
    },
    Success(AnalysisResult),
    Failure {
        message: String,
    },
}
