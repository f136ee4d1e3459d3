//! gap-analyzer: submit a CV and a job description for skill-gap analysis.

use std::fs;
use std::io::Read;

use anyhow::Context;
use clap::Parser;
use gap_core::{FailureKind, ResultState};
use gap_logging::gap_info;

mod cli;
mod config;
mod platform;

use cli::{Cli, ExitCode, OutputFormat};
use platform::app::{run_app, Inputs};
use platform::ui::render;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error.into()
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let (file_config, config_path) = config::load(cli.config.as_deref())?;
    let settings = config::Settings::resolve(file_config, cli)?;
    platform::logging::initialize(settings.log_destination, settings.log_level);
    if let Some(path) = config_path {
        gap_info!("Loaded configuration from {}", path.display());
    }

    let inputs = Inputs {
        cv: cli.cv.clone(),
        job_description: read_job_description(cli)?,
    };
    let state = run_app(&settings, inputs, cli.quiet)?;

    let view = state.view();
    let output = match cli.format {
        OutputFormat::Text => render::report_text(&view),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&render::report_json(&view, chrono::Utc::now()))?
        }
    };
    println!("{}", output.trim_end());

    Ok(match state.result() {
        ResultState::Success(_) => ExitCode::Success,
        ResultState::Failure(failure) if failure.kind == FailureKind::MissingInput => {
            ExitCode::InvalidInput
        }
        ResultState::Failure(_) | ResultState::Idle | ResultState::Loading { .. } => {
            ExitCode::AnalysisFailed
        }
    })
}

fn read_job_description(cli: &Cli) -> anyhow::Result<String> {
    if let Some(text) = &cli.job_description {
        return Ok(text.clone());
    }
    match cli.job_file.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read job description from stdin")?;
            Ok(text)
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read job description from {}", path.display())),
        None => Ok(String::new()),
    }
}
