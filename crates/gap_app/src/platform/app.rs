use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use gap_core::{update, AppState, CvFile, Failure, FailureKind, Msg};
use gap_engine::EngineHandle;
use gap_logging::gap_error;

use super::effects::EffectRunner;
use super::ui::render::TerminalRenderer;
use crate::config::Settings;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// User inputs for one run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub cv: Option<PathBuf>,
    pub job_description: String,
}

/// Runs one submission to completion and returns the settled state.
pub fn run_app(settings: &Settings, inputs: Inputs, quiet: bool) -> anyhow::Result<AppState> {
    let engine =
        EngineHandle::new(settings.engine_config()).context("failed to start analysis engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx);

    let mut controller = SubmissionController::new(
        AppState::with_stages(settings.pipeline.stages.clone()),
        runner,
        TerminalRenderer::new(quiet),
    );
    controller.dispatch(Msg::CvSelected(inputs.cv.map(CvFile::from_path)));
    controller.dispatch(Msg::JobDescriptionChanged(inputs.job_description));
    controller.dispatch(Msg::SubmitClicked);
    controller.run_until_settled(&msg_rx);

    Ok(controller.into_state())
}

/// Owns the workflow state; every change goes through `update`.
struct SubmissionController {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
}

impl SubmissionController {
    fn new(state: AppState, runner: EffectRunner, renderer: TerminalRenderer) -> Self {
        Self {
            state,
            runner,
            renderer,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            self.renderer.render(&self.state.view());
        }
    }

    fn run_until_settled(&mut self, msg_rx: &mpsc::Receiver<Msg>) {
        while let Some(submission_id) = self.state.in_flight() {
            match msg_rx.recv_timeout(TICK_INTERVAL) {
                Ok(msg) => self.dispatch(msg),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    self.dispatch(Msg::Tick);
                    self.renderer.tick();
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    gap_error!("Engine stopped before submission {} finished", submission_id);
                    self.dispatch(Msg::AnalysisDone {
                        submission_id,
                        outcome: Err(Failure::new(FailureKind::Network, "engine stopped")),
                    });
                }
            }
        }
    }

    fn into_state(self) -> AppState {
        self.state
    }
}
