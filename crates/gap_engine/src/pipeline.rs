use std::time::Duration;

use futures_util::future::{self, Either};
use futures_util::{pin_mut, StreamExt};
use gap_logging::gap_debug;

use crate::parse::extract_result;
use crate::progress::{play_stages, ProgressSink, DEFAULT_STAGE_DELAY};
use crate::{
    AnalysisClient, AnalysisError, AnalysisRequest, AnalysisResult, EngineEvent, FailureKind,
    SubmissionId,
};

/// How the decorative stage sequence relates to the real request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Play every stage, then dispatch.
    #[default]
    Sequential,
    /// Dispatch immediately and play stages until the response arrives.
    Concurrent,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub stages: Vec<String>,
    pub stage_delay: Duration,
    pub progress_mode: ProgressMode,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            stage_delay: DEFAULT_STAGE_DELAY,
            progress_mode: ProgressMode::default(),
        }
    }
}

/// Plays the stages, sends the request and parses the response.
///
/// In sequential mode the order is fixed: every stage, then `send`, then
/// parsing. The request is consumed and dropped once the response is in.
pub async fn run_submission(
    client: &dyn AnalysisClient,
    submission_id: SubmissionId,
    request: AnalysisRequest,
    settings: &PipelineSettings,
    sink: &dyn ProgressSink,
) -> Result<AnalysisResult, AnalysisError> {
    let body = match settings.progress_mode {
        ProgressMode::Sequential => {
            play_into(sink, submission_id, settings).await;
            client.send(&request).await?
        }
        ProgressMode::Concurrent => {
            let playback = play_into(sink, submission_id, settings);
            let send = client.send(&request);
            pin_mut!(playback);
            pin_mut!(send);
            match future::select(playback, send).await {
                Either::Left(((), send)) => send.await?,
                Either::Right((body, _)) => body?,
            }
        }
    };
    drop(request);

    gap_debug!("Parsing response of submission {}", submission_id);
    extract_result(&body).map_err(|err| AnalysisError::new(FailureKind::Parse, err.to_string()))
}

async fn play_into(sink: &dyn ProgressSink, submission_id: SubmissionId, settings: &PipelineSettings) {
    let playback = play_stages(settings.stages.clone(), settings.stage_delay);
    pin_mut!(playback);
    while let Some(stage) = playback.next().await {
        gap_debug!(
            "Submission {} stage {}/{}: {}",
            submission_id,
            stage.index + 1,
            stage.total,
            stage.label
        );
        sink.emit(EngineEvent::Progress {
            submission_id,
            stage,
        });
    }
}
