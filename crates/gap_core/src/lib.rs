//! Gap analyzer core: pure submission state machine and view-model helpers.
mod effect;
mod msg;
mod result;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use result::{
    AnalysisResult, Failure, FailureKind, ResultState, SubmissionId, ANALYSIS_FAILED_MESSAGE,
    MISSING_INPUT_MESSAGE,
};
pub use state::{AppState, CvFile, PROGRESS_STAGES};
pub use update::update;
pub use view_model::{AppViewModel, ResultView};
