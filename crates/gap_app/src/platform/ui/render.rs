use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gap_core::{AnalysisResult, AppViewModel, ResultView};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::constants::*;

/// Draws the loading stages on stderr while a submission is in flight.
pub struct TerminalRenderer {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl TerminalRenderer {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    pub fn render(&mut self, view: &AppViewModel) {
        match &view.result {
            ResultView::Loading {
                label,
                position,
                stage_count,
            } => {
                let quiet = self.quiet;
                let bar = self
                    .bar
                    .get_or_insert_with(|| new_bar(*stage_count as u64, quiet));
                bar.set_position(*position as u64);
                bar.set_message(label.clone());
            }
            ResultView::Idle | ResultView::Success(_) | ResultView::Failure { .. } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    pub fn tick(&self) {
        if let Some(bar) = &self.bar {
            bar.tick();
        }
    }
}

fn new_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Human-readable report for stdout.
pub fn report_text(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    match &view.result {
        ResultView::Success(result) => write_sections(&mut out, result),
        ResultView::Failure { message } => {
            let _ = writeln!(out, "\n{message}");
        }
        ResultView::Loading { label, .. } => {
            let _ = writeln!(out, "\n{label}");
        }
        ResultView::Idle => {}
    }
    out
}

fn write_sections(out: &mut String, result: &AnalysisResult) {
    for (heading, items, empty) in [
        (HEADING_MATCHED, &result.matched, EMPTY_MATCHED),
        (HEADING_MISSING, &result.missing, EMPTY_MISSING),
        (HEADING_SUGGESTIONS, &result.suggestions, EMPTY_SUGGESTIONS),
    ] {
        let _ = writeln!(out, "\n{heading}");
        if items.is_empty() {
            let _ = writeln!(out, "  {empty}");
        }
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonReport<'a> {
    Idle,
    Loading {
        stage: &'a str,
    },
    Success {
        analyzed_at: String,
        matched: &'a [String],
        missing: &'a [String],
        suggestions: &'a [String],
    },
    Failure {
        message: &'a str,
    },
}

/// Machine-readable report for stdout.
pub fn report_json(view: &AppViewModel, analyzed_at: DateTime<Utc>) -> serde_json::Value {
    let report = match &view.result {
        ResultView::Idle => JsonReport::Idle,
        ResultView::Loading { label, .. } => JsonReport::Loading { stage: label },
        ResultView::Success(result) => JsonReport::Success {
            analyzed_at: analyzed_at.to_rfc3339(),
            matched: &result.matched,
            missing: &result.missing,
            suggestions: &result.suggestions,
        },
        ResultView::Failure { message } => JsonReport::Failure { message },
    };
    serde_json::to_value(report).unwrap_or(serde_json::Value::Null)
}
