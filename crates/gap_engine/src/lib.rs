//! Gap analyzer engine: request dispatch, response parsing and effect execution.
mod client;
mod engine;
mod parse;
mod pipeline;
mod progress;
mod types;

pub use client::{
    AnalysisClient, ClientSettings, ReqwestAnalysisClient, CV_FIELD, DEFAULT_ENDPOINT,
    JOB_DESCRIPTION_FIELD,
};
pub use engine::{EngineConfig, EngineHandle};
pub use parse::{extract_result, strip_fences, ParseError, RAW_OUTPUT_FIELD};
pub use pipeline::{run_submission, PipelineSettings, ProgressMode};
pub use progress::{play_stages, ChannelProgressSink, ProgressSink, DEFAULT_STAGE_DELAY};
pub use types::{
    AnalysisError, AnalysisRequest, AnalysisResult, Document, EngineEvent, FailureKind,
    ProgressStage, SubmissionId,
};
