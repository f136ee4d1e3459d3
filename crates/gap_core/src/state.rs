use std::path::{Path, PathBuf};

use gap_logging::gap_debug;

use crate::view_model::{AppViewModel, ResultView};
use crate::{AnalysisResult, Failure, ResultState, SubmissionId};

/// Cosmetic stages shown while an analysis is running.
pub const PROGRESS_STAGES: [&str; 5] = [
    "Extracting CV content...",
    "Analyzing job requirements...",
    "Comparing skills and experience...",
    "Generating recommendations...",
    "Finalizing analysis...",
];

/// CV document chosen by the user. Only the location is tracked here; the
/// engine reads the bytes when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvFile {
    pub path: PathBuf,
    pub name: String,
}

impl CvFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    cv: Option<CvFile>,
    job_description: String,
    stages: Vec<String>,
    result: ResultState,
    last_submission: SubmissionId,
    in_flight: Option<SubmissionId>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_stages(PROGRESS_STAGES.iter().map(|s| s.to_string()).collect())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(stages: Vec<String>) -> Self {
        Self {
            cv: None,
            job_description: String::new(),
            stages,
            result: ResultState::Idle,
            last_submission: 0,
            in_flight: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let result = match &self.result {
            ResultState::Idle => ResultView::Idle,
            ResultState::Loading {
                label,
                stage,
                stage_count,
            } => ResultView::Loading {
                label: label.clone(),
                position: (*stage + 1).min(*stage_count),
                stage_count: *stage_count,
            },
            ResultState::Success(result) => ResultView::Success(result.clone()),
            ResultState::Failure(failure) => ResultView::Failure {
                message: failure.user_message().to_string(),
            },
        };
        AppViewModel {
            cv_name: self.cv.as_ref().map(|cv| cv.name.clone()),
            job_description_chars: self.job_description.chars().count(),
            busy: self.in_flight.is_some(),
            result,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn result(&self) -> &ResultState {
        &self.result
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn cv(&self) -> Option<&CvFile> {
        self.cv.as_ref()
    }

    pub(crate) fn job_description(&self) -> &str {
        &self.job_description
    }

    pub(crate) fn set_cv(&mut self, cv: Option<CvFile>) {
        if self.cv != cv {
            self.cv = cv;
            self.dirty = true;
        }
    }

    pub(crate) fn set_job_description(&mut self, text: String) {
        if self.job_description != text {
            self.job_description = text;
            self.dirty = true;
        }
    }

    /// Allocates the next submission id and forgets the in-flight one, returning it.
    pub(crate) fn begin_submission(&mut self) -> (SubmissionId, Option<SubmissionId>) {
        self.last_submission += 1;
        (self.last_submission, self.in_flight.take())
    }

    pub(crate) fn start_loading(&mut self, submission_id: SubmissionId) {
        self.in_flight = Some(submission_id);
        self.result = ResultState::Loading {
            label: self.stages.first().cloned().unwrap_or_default(),
            stage: 0,
            stage_count: self.stages.len(),
        };
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, failure: Failure) {
        self.result = ResultState::Failure(failure);
        self.dirty = true;
    }

    pub(crate) fn apply_stage(&mut self, submission_id: SubmissionId, stage: usize, label: String) {
        if self.in_flight != Some(submission_id) {
            gap_debug!(
                "Dropping stage {} of stale submission {} (latest {})",
                stage,
                submission_id,
                self.last_submission
            );
            return;
        }
        if let ResultState::Loading {
            label: current,
            stage: current_stage,
            ..
        } = &mut self.result
        {
            *current = label;
            *current_stage = stage;
            self.dirty = true;
        }
    }

    pub(crate) fn apply_done(
        &mut self,
        submission_id: SubmissionId,
        outcome: Result<AnalysisResult, Failure>,
    ) {
        if self.in_flight != Some(submission_id) {
            gap_debug!(
                "Dropping outcome of stale submission {} (latest {})",
                submission_id,
                self.last_submission
            );
            return;
        }
        self.in_flight = None;
        self.result = match outcome {
            Ok(result) => ResultState::Success(result),
            Err(failure) => ResultState::Failure(failure),
        };
        self.dirty = true;
    }
}
