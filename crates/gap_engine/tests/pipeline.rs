use std::sync::{Arc, Mutex};
use std::time::Duration;

use gap_engine::{
    run_submission, AnalysisClient, AnalysisError, AnalysisRequest, Document, EngineEvent,
    FailureKind, PipelineSettings, ProgressMode, ProgressSink,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const STAGES: [&str; 5] = [
    "Extracting CV content...",
    "Analyzing job requirements...",
    "Comparing skills and experience...",
    "Generating recommendations...",
    "Finalizing analysis...",
];

/// Shared, ordered record of what happened during a submission.
#[derive(Clone, Default)]
struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ProgressSink for Journal {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::Progress { stage, .. } = event {
            self.push(stage.label);
        }
    }
}

struct ScriptedClient {
    journal: Journal,
    response: Result<Value, AnalysisError>,
    delay: Duration,
}

#[async_trait::async_trait]
impl AnalysisClient for ScriptedClient {
    async fn send(&self, request: &AnalysisRequest) -> Result<Value, AnalysisError> {
        self.journal
            .push(format!("send:{}", request.document.file_name));
        tokio::time::sleep(self.delay).await;
        self.response.clone()
    }
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        document: Document::new("cv.docx", b"cv".to_vec()),
        job_description: "Platform engineer".to_string(),
    }
}

fn settings(mode: ProgressMode) -> PipelineSettings {
    PipelineSettings {
        stages: STAGES.iter().map(|s| s.to_string()).collect(),
        stage_delay: Duration::from_millis(5),
        progress_mode: mode,
    }
}

fn client(journal: &Journal, response: Result<Value, AnalysisError>) -> ScriptedClient {
    ScriptedClient {
        journal: journal.clone(),
        response,
        delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn sequential_mode_plays_every_stage_before_sending() {
    let journal = Journal::default();
    let client = client(
        &journal,
        Ok(json!({ "raw_output": "```json\n{\"matched\":[\"Rust\"]}\n```" })),
    );

    let result = run_submission(
        &client,
        1,
        request(),
        &settings(ProgressMode::Sequential),
        &journal,
    )
    .await
    .expect("analysis ok");

    let mut expected: Vec<String> = STAGES.iter().map(|s| s.to_string()).collect();
    expected.push("send:cv.docx".to_string());
    assert_eq!(journal.entries(), expected);
    assert_eq!(result.matched, vec!["Rust".to_string()]);
}

#[tokio::test]
async fn client_failure_is_passed_through() {
    let journal = Journal::default();
    let client = client(
        &journal,
        Err(AnalysisError {
            kind: FailureKind::Network,
            message: "connection refused".to_string(),
        }),
    );

    let err = run_submission(
        &client,
        2,
        request(),
        &settings(ProgressMode::Sequential),
        &journal,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, FailureKind::Network);
    assert!(!err.kind.is_parse());
}

#[tokio::test]
async fn unparseable_payload_is_a_parse_failure() {
    let journal = Journal::default();
    let client = client(&journal, Ok(json!({ "raw_output": "```json\nnot json\n```" })));

    let err = run_submission(
        &client,
        3,
        request(),
        &settings(ProgressMode::Sequential),
        &journal,
    )
    .await
    .unwrap_err();

    assert!(err.kind.is_parse());
}

#[tokio::test]
async fn concurrent_mode_sends_before_playback_finishes() {
    let journal = Journal::default();
    let client = client(&journal, Ok(json!({ "matched": ["Go"] })));
    let mut settings = settings(ProgressMode::Concurrent);
    settings.stage_delay = Duration::from_millis(50);

    let result = run_submission(&client, 4, request(), &settings, &journal)
        .await
        .expect("analysis ok");

    let entries = journal.entries();
    assert_eq!(result.matched, vec!["Go".to_string()]);
    assert!(entries.contains(&"send:cv.docx".to_string()));
    assert!(entries.len() < STAGES.len() + 1);
}

#[tokio::test]
async fn concurrent_mode_waits_for_a_slow_response() {
    let journal = Journal::default();
    let client = ScriptedClient {
        journal: journal.clone(),
        response: Ok(json!({ "suggestions": ["Ship it"] })),
        delay: Duration::from_millis(80),
    };
    let result = run_submission(
        &client,
        5,
        request(),
        &settings(ProgressMode::Concurrent),
        &journal,
    )
    .await
    .expect("analysis ok");

    assert_eq!(result.suggestions, vec!["Ship it".to_string()]);
    assert_eq!(journal.entries().len(), STAGES.len() + 1);
}
