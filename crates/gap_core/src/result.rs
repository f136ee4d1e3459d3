use std::fmt;

/// Monotonically increasing tag for one submit attempt. Zero means "none yet".
pub type SubmissionId = u64;

pub const MISSING_INPUT_MESSAGE: &str = "Please upload a CV and enter a job description";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze. Please try again.";

/// Skill-gap report returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// CV or job description absent; nothing was sent.
    MissingInput,
    /// Transport, status, size or top-level decoding problem.
    Network,
    /// Payload was not the expected JSON after fence stripping.
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingInput => write!(f, "missing input"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Parse => write!(f, "parse error"),
        }
    }
}

/// Structured failure kept in state; the user-facing text is derived from `kind` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_input() -> Self {
        Self::new(FailureKind::MissingInput, "cv or job description not provided")
    }

    pub fn user_message(&self) -> &'static str {
        match self.kind {
            FailureKind::MissingInput => MISSING_INPUT_MESSAGE,
            FailureKind::Network | FailureKind::Parse => ANALYSIS_FAILED_MESSAGE,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// What the workflow currently shows. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultState {
    #[default]
    Idle,
    Loading {
        label: String,
        stage: usize,
        stage_count: usize,
    },
    Success(AnalysisResult),
    Failure(Failure),
}

impl ResultState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading { .. })
    }
}
