use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use gap_logging::{gap_error, gap_info};
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::{AnalysisClient, ClientSettings, ReqwestAnalysisClient};
use crate::pipeline::{run_submission, PipelineSettings};
use crate::progress::ChannelProgressSink;
use crate::{AnalysisError, AnalysisRequest, AnalysisResult, Document, EngineEvent, FailureKind, SubmissionId};

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        cv_path: PathBuf,
        job_description: String,
    },
    Cancel {
        submission_id: SubmissionId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub client: ClientSettings,
    pub pipeline: PipelineSettings,
}

/// Runs submissions on a background single-threaded tokio runtime and
/// reports their progress and outcome as `EngineEvent`s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        let client = ReqwestAnalysisClient::new(config.client)?;
        Ok(Self::with_client(Arc::new(client), config.pipeline))
    }

    pub fn with_client(client: Arc<dyn AnalysisClient>, pipeline: PipelineSettings) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    gap_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(run_commands(cmd_rx, client, Arc::new(pipeline), event_tx));
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn submit(&self, submission_id: SubmissionId, cv_path: PathBuf, job_description: String) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission_id,
            cv_path,
            job_description,
        });
    }

    pub fn cancel(&self, submission_id: SubmissionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { submission_id });
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        match self.event_rx.lock() {
            Ok(rx) => rx.recv_timeout(timeout),
            Err(_) => Err(mpsc::RecvTimeoutError::Disconnected),
        }
    }
}

async fn run_commands(
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    client: Arc<dyn AnalysisClient>,
    pipeline: Arc<PipelineSettings>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    // Finished submissions cancel their own token, so cancelled entries can be pruned.
    let mut in_flight: HashMap<SubmissionId, CancellationToken> = HashMap::new();

    while let Some(command) = cmd_rx.recv().await {
        in_flight.retain(|_, token| !token.is_cancelled());
        match command {
            EngineCommand::Submit {
                submission_id,
                cv_path,
                job_description,
            } => {
                let token = CancellationToken::new();
                in_flight.insert(submission_id, token.clone());
                let client = client.clone();
                let pipeline = pipeline.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let sink = ChannelProgressSink::new(event_tx.clone());
                    let result = token
                        .run_until_cancelled(handle_submission(
                            client.as_ref(),
                            submission_id,
                            cv_path,
                            job_description,
                            &pipeline,
                            &sink,
                        ))
                        .await
                        .unwrap_or_else(|| {
                            Err(AnalysisError::new(
                                FailureKind::Cancelled,
                                "superseded by a newer submission",
                            ))
                        });
                    token.cancel();
                    let _ = event_tx.send(EngineEvent::SubmissionCompleted {
                        submission_id,
                        result,
                    });
                });
            }
            EngineCommand::Cancel { submission_id } => {
                if let Some(token) = in_flight.remove(&submission_id) {
                    gap_info!("Cancelling submission {}", submission_id);
                    token.cancel();
                }
            }
        }
    }
}

async fn handle_submission(
    client: &dyn AnalysisClient,
    submission_id: SubmissionId,
    cv_path: PathBuf,
    job_description: String,
    pipeline: &PipelineSettings,
    sink: &ChannelProgressSink,
) -> Result<AnalysisResult, AnalysisError> {
    let document = Document::load(&cv_path).await?;
    let request = AnalysisRequest {
        document,
        job_description,
    };
    run_submission(client, submission_id, request, pipeline, sink).await
}
