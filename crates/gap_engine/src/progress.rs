use std::time::Duration;

use futures_util::stream::{self, Stream};

use crate::{EngineEvent, ProgressStage};

/// Per-stage display time used when nothing else is configured.
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(600);

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Plays `stages` in order: each label is yielded, then held for `delay`
/// before the next one. The stream ends once the last label's delay has
/// elapsed. Nothing happens until it is polled, and it cannot be replayed.
pub fn play_stages(stages: Vec<String>, delay: Duration) -> impl Stream<Item = ProgressStage> {
    let total = stages.len();
    stream::unfold(
        (stages.into_iter().enumerate(), false),
        move |(mut remaining, showing)| async move {
            if showing {
                tokio::time::sleep(delay).await;
            }
            remaining.next().map(|(index, label)| {
                (
                    ProgressStage {
                        index,
                        total,
                        label,
                    },
                    (remaining, true),
                )
            })
        },
    )
}
