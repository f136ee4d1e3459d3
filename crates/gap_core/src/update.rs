use gap_logging::{gap_info, gap_warn};

use crate::{AppState, Effect, Failure, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CvSelected(cv) => {
            state.set_cv(cv);
            Vec::new()
        }
        Msg::JobDescriptionChanged(text) => {
            state.set_job_description(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::StageStarted {
            submission_id,
            stage,
            label,
        } => {
            state.apply_stage(submission_id, stage, label);
            Vec::new()
        }
        Msg::AnalysisDone {
            submission_id,
            outcome,
        } => {
            if let Err(failure) = &outcome {
                gap_warn!("Submission {} failed: {}", submission_id, failure);
            }
            state.apply_done(submission_id, outcome);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    // Every submit supersedes the previous one, including a rejected submit.
    let (submission_id, superseded) = state.begin_submission();
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        effects.push(Effect::CancelAnalysis {
            submission_id: previous,
        });
    }

    let cv_path = match state.cv() {
        Some(cv) if !state.job_description().is_empty() => cv.path.clone(),
        _ => {
            gap_info!("Submission {} rejected: missing input", submission_id);
            state.fail(Failure::missing_input());
            return effects;
        }
    };

    gap_info!(
        "Submission {} accepted: cv={:?} job_description_len={}",
        submission_id,
        cv_path,
        state.job_description().len()
    );
    let job_description = state.job_description().to_string();
    state.start_loading(submission_id);
    effects.push(Effect::StartAnalysis {
        submission_id,
        cv_path,
        job_description,
    });
    effects
}
