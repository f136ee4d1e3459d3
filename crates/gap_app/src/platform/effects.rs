use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gap_core::{AnalysisResult, Effect, Failure, FailureKind, Msg};
use gap_engine::{AnalysisError, EngineEvent, EngineHandle};
use gap_logging::{gap_debug, gap_info};

const EVENT_POLL: Duration = Duration::from_millis(50);

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartAnalysis {
                    submission_id,
                    cv_path,
                    job_description,
                } => {
                    gap_info!(
                        "StartAnalysis submission_id={} cv={:?} job_description_len={}",
                        submission_id,
                        cv_path,
                        job_description.len()
                    );
                    self.engine.submit(submission_id, cv_path, job_description);
                }
                Effect::CancelAnalysis { submission_id } => {
                    self.engine.cancel(submission_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let event = match engine.recv_timeout(EVENT_POLL) {
                Ok(event) => event,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    gap_debug!("Engine event channel closed");
                    break;
                }
            };
            let msg = match event {
                EngineEvent::Progress {
                    submission_id,
                    stage,
                } => Msg::StageStarted {
                    submission_id,
                    stage: stage.index,
                    label: stage.label,
                },
                EngineEvent::SubmissionCompleted {
                    submission_id,
                    result,
                } => Msg::AnalysisDone {
                    submission_id,
                    outcome: result.map(map_result).map_err(map_failure),
                },
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        });
    }
}

fn map_result(result: gap_engine::AnalysisResult) -> AnalysisResult {
    AnalysisResult {
        matched: result.matched,
        missing: result.missing,
        suggestions: result.suggestions,
    }
}

fn map_failure(err: AnalysisError) -> Failure {
    let kind = if err.kind.is_parse() {
        FailureKind::Parse
    } else {
        FailureKind::Network
    };
    Failure::new(kind, err.to_string())
}
